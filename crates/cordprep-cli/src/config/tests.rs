#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.sections.min_tokens, 200);
        assert_eq!(
            config.data.source_root(),
            PathBuf::from("data/interim/covid_nlp_20200319")
        );
        assert_eq!(config.data.metadata_file, "all_sources_metadata_2020-03-13.csv");
    }

    #[test]
    fn test_partial_sections_override() {
        let config = Config::from_toml_str(
            r#"
            [data]
            unpack_dir = "/srv/cord"

            [sections]
            min_tokens = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.sections.min_tokens, 50);
        assert_eq!(config.data.extract_dir, default_extract_dir());
        assert_eq!(
            config.data.metadata_path(&config.data.source_root()),
            PathBuf::from("/srv/cord/covid_nlp_20200319/all_sources_metadata_2020-03-13.csv")
        );
    }

    #[test]
    fn test_empty_extract_dir_is_rejected() {
        let err = Config::from_toml_str("[data]\nextract_dir = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("extract_dir"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(Config::from_toml_str("[sections]\nmin_tokens = \"many\"\n").is_err());
    }
}
