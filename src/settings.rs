use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Runtime configuration. Layered from defaults, an optional `trivia.toml`
/// and `TRIVIA_*` environment variables (highest precedence).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub questions_per_page: u32,
    /// Added to a client-side category index to get the category id.
    pub category_id_offset: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            db_path: "trivia.db".to_owned(),
            questions_per_page: 10,
            category_id_offset: 1,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("trivia").required(false))
                .add_source(Environment::with_prefix("TRIVIA").try_parsing(true)),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let settings: Settings = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("db_path", defaults.db_path)?
            .set_default("questions_per_page", i64::from(defaults.questions_per_page))?
            .set_default("category_id_offset", defaults.category_id_offset)?
            .add_source(builder.build()?)
            .build()?
            .try_deserialize()?;

        if settings.questions_per_page == 0 {
            return Err(ConfigError::Message(
                "questions_per_page must be greater than zero".to_owned(),
            ));
        }
        Ok(settings)
    }

    /// Maps a zero-based client category index to a category id.
    pub fn category_id(&self, index: i64) -> Option<i64> {
        index.checked_add(self.category_id_offset)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
