pub mod all_series;
pub mod import_list;
pub mod import_list_exclusion;

pub use all_series::AllSeriesDataSource;
pub use import_list::ImportListDataSource;
pub use import_list_exclusion::ImportListExclusionDataSource;
