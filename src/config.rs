use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::accession::DEFAULT_HEADER_TOKEN;
use crate::domain::{DEFAULT_FALLBACK_NAME, Rank, RankScheme};
use crate::error::TaxError;
use crate::propagate::PropagationKind;
use crate::sanitize::NameSanitizer;
use crate::writer::SpeciesLabel;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub ranks: Option<Vec<String>>,
    #[serde(default)]
    pub fallback_name: Option<String>,
    #[serde(default)]
    pub accession_header: Option<String>,
    #[serde(default)]
    pub extra_allowed_characters: Option<String>,
    #[serde(default)]
    pub propagation: Option<PropagationKind>,
    #[serde(default)]
    pub species_label: Option<SpeciesLabel>,
}

#[derive(Debug, Clone)]
pub struct CurationSettings {
    pub scheme: RankScheme,
    pub sanitizer: NameSanitizer,
    pub fallback_name: String,
    pub accession_header: String,
    pub propagation: PropagationKind,
    pub species_label: SpeciesLabel,
}

impl Default for CurationSettings {
    fn default() -> Self {
        Self {
            scheme: RankScheme::default(),
            sanitizer: NameSanitizer::new(),
            fallback_name: DEFAULT_FALLBACK_NAME.to_string(),
            accession_header: DEFAULT_HEADER_TOKEN.to_string(),
            propagation: PropagationKind::default(),
            species_label: SpeciesLabel::default(),
        }
    }
}

impl CurationSettings {
    pub fn with_overrides(
        mut self,
        include_species: bool,
        propagation: Option<PropagationKind>,
    ) -> Self {
        if include_species {
            self.species_label = SpeciesLabel::Column;
        }
        if let Some(propagation) = propagation {
            self.propagation = propagation;
        }
        self
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<CurationSettings, TaxError> {
        let Some(path) = path else {
            return Ok(CurationSettings::default());
        };
        let config_path = PathBuf::from(path);
        let content = fs::read_to_string(&config_path)
            .map_err(|_| TaxError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| TaxError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<CurationSettings, TaxError> {
        let schema_version = config.schema_version.unwrap_or(1);
        if schema_version != 1 {
            return Err(TaxError::InvalidConfig(format!(
                "unsupported schema_version {schema_version}"
            )));
        }

        let scheme = match config.ranks {
            Some(ranks) => RankScheme::new(
                ranks
                    .iter()
                    .map(|rank| rank.parse::<Rank>())
                    .collect::<Result<Vec<_>, TaxError>>()?,
            )?,
            None => RankScheme::default(),
        };

        let sanitizer = match config.extra_allowed_characters.as_deref() {
            Some(extra) => {
                if let Some(ch) = extra.chars().find(|ch| *ch == ';' || ch.is_control()) {
                    return Err(TaxError::InvalidConfig(format!(
                        "extra_allowed_characters must not contain {ch:?}"
                    )));
                }
                NameSanitizer::with_extra_allowed(extra)
            }
            None => NameSanitizer::new(),
        };

        let fallback_name = config
            .fallback_name
            .unwrap_or_else(|| DEFAULT_FALLBACK_NAME.to_string());
        if fallback_name.is_empty() || sanitizer.sanitize(&fallback_name) != fallback_name {
            return Err(TaxError::InvalidConfig(format!(
                "fallback_name {fallback_name:?} must be a non-empty sanitized name"
            )));
        }

        let accession_header = config
            .accession_header
            .unwrap_or_else(|| DEFAULT_HEADER_TOKEN.to_string());
        if accession_header.is_empty() {
            return Err(TaxError::InvalidConfig(
                "accession_header must not be empty".to_string(),
            ));
        }

        Ok(CurationSettings {
            scheme,
            sanitizer,
            fallback_name,
            accession_header,
            propagation: config.propagation.unwrap_or_default(),
            species_label: config.species_label.unwrap_or_default(),
        })
    }
}
