use sonarr::SonarrProvider;

tfplug::serve_provider!(SonarrProvider::new());
