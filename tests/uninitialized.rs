// SPDX-License-Identifier: MIT OR Apache-2.0

#[cfg(test)]
mod tests {
    use logshim::{ConfigError, InitOptions, LoggerOptions, create, environment, init};

    // one test, since initialization is process-wide and ordered
    #[test]
    fn create_requires_init_then_filename() {
        assert!(environment().is_none());
        assert_eq!(
            create(LoggerOptions::new("src/a.rs")).unwrap_err(),
            ConfigError::NotInitialized
        );
        assert_eq!(
            ConfigError::NotInitialized.to_string(),
            "You should initialize the log module first."
        );

        let first = init(InitOptions::default());
        assert!(!first.is_production());
        // later calls keep the first environment
        let second = init(InitOptions::production());
        assert_eq!(first, second);
        assert!(!environment().unwrap().is_production());

        let err = create(LoggerOptions::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingFilename);
        assert_eq!(
            err.to_string(),
            "Missing parameter `filename` for creating new logger."
        );

        let logger = create(LoggerOptions::new("src/a.rs")).unwrap();
        assert_eq!(logger.filename(), "src/a.rs");
        assert!(!logger.is_production());
    }
}
