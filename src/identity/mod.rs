//! Identity normalization: canonical player names, keys, and team codes.
//!
//! All correction tables are process-wide immutable configuration, loaded
//! once from embedded JSON and passed explicitly to the consumers that need
//! them. Lookups never fail: an unknown name passes through with a
//! synthesized key.

use crate::cli::types::Season;
use lru::LruCache;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;


const NAME_CORRECTIONS_JSON: &str = include_str!("../data/name_corrections.json");
const TEAM_CODES_JSON: &str = include_str!("../data/team_codes.json");
const DUPLICATE_RULES_JSON: &str = include_str!("../data/duplicate_rules.json");

/// Normalization lookups are hot (every shift row and event slot goes
/// through them), so resolved identities sit in a small L1 cache.
const IDENTITY_CACHE_SIZE: usize = 2048;

/// One disambiguation rule for a duplicate-name collision. Conditions that
/// are present must all hold; a rule with no conditions is the default.
#[derive(Debug, Clone, Deserialize)]
pub struct DisambiguationRule {
    #[serde(default)]
    pub season_min: Option<u16>,
    #[serde(default)]
    pub season_max: Option<u16>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub jersey: Option<u8>,
    pub key: String,
}

impl DisambiguationRule {
    fn matches(&self, season: Season, position: Option<&str>, jersey: Option<u8>) -> bool {
        if let Some(min) = self.season_min {
            if season.as_u16() < min {
                return false;
            }
        }
        if let Some(max) = self.season_max {
            if season.as_u16() > max {
                return false;
            }
        }
        if let Some(want) = &self.position {
            match position {
                Some(p) if p.eq_ignore_ascii_case(want) => {}
                _ => return false,
            }
        }
        if let Some(want) = self.jersey {
            if jersey != Some(want) {
                return false;
            }
        }
        true
    }
}

/// Rules for one colliding name, evaluated in listed order so exactly one
/// identity is ever produced for a given (name, season, position) tuple.
#[derive(Debug, Clone, Deserialize)]
pub struct DuplicateEntry {
    pub name: String,
    pub rules: Vec<DisambiguationRule>,
}

/// The static correction tables, loaded once at startup.
#[derive(Debug)]
pub struct IdentityTables {
    corrections: HashMap<String, String>,
    team_codes: HashMap<String, String>,
    duplicates: HashMap<String, Vec<DisambiguationRule>>,
}

impl IdentityTables {
    /// Load the embedded tables. The embedded JSON is part of the build,
    /// so a parse failure is a build defect, not a runtime condition.
    pub fn embedded() -> Self {
        let corrections: HashMap<String, String> =
            serde_json::from_str(NAME_CORRECTIONS_JSON).unwrap_or_default();
        let team_codes: HashMap<String, String> =
            serde_json::from_str(TEAM_CODES_JSON).unwrap_or_default();
        let entries: Vec<DuplicateEntry> =
            serde_json::from_str(DUPLICATE_RULES_JSON).unwrap_or_default();
        let duplicates = entries.into_iter().map(|e| (e.name, e.rules)).collect();
        Self {
            corrections,
            team_codes,
            duplicates,
        }
    }
}

/// A resolved identity: display name plus canonical cross-source key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerIdentity {
    pub display_name: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    name: String,
    season: Season,
    position: Option<String>,
    jersey: Option<u8>,
}

/// Canonicalizes player names and team codes across sources.
pub struct Normalizer {
    tables: IdentityTables,
    cache: Mutex<LruCache<CacheKey, PlayerIdentity>>,
}

impl Normalizer {
    pub fn new(tables: IdentityTables) -> Self {
        let cap = NonZeroUsize::new(IDENTITY_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            tables,
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Resolve a raw player name to its canonical identity.
    ///
    /// Never fails: unknown names pass through normalization and get a
    /// synthesized `FIRST.LAST` key.
    pub fn normalize(
        &self,
        raw_name: &str,
        season: Season,
        position: Option<&str>,
        jersey: Option<u8>,
    ) -> PlayerIdentity {
        let cache_key = CacheKey {
            name: raw_name.to_string(),
            season,
            position: position.map(|p| p.to_uppercase()),
            jersey,
        };
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&cache_key) {
                return hit.clone();
            }
        }

        let resolved = self.resolve(raw_name, season, position, jersey);
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(cache_key, resolved.clone());
        }
        resolved
    }

    fn resolve(
        &self,
        raw_name: &str,
        season: Season,
        position: Option<&str>,
        jersey: Option<u8>,
    ) -> PlayerIdentity {
        let cleaned = clean_name(raw_name);
        let display = self
            .tables
            .corrections
            .get(&cleaned)
            .cloned()
            .unwrap_or(cleaned);

        let key = match self.tables.duplicates.get(&display) {
            Some(rules) => rules
                .iter()
                .find(|r| r.matches(season, position, jersey))
                .map(|r| r.key.clone())
                .unwrap_or_else(|| synthesize_key(&display)),
            None => synthesize_key(&display),
        };

        PlayerIdentity {
            display_name: display,
            key,
        }
    }

    /// Canonical three-letter team code, mapping historical and dotted
    /// alternates ("PHX" -> "ARI", "S.J" -> "SJS"). Unknown codes pass
    /// through uppercased.
    pub fn team_code(&self, raw: &str) -> String {
        let up = raw.trim().to_uppercase();
        self.tables.team_codes.get(&up).cloned().unwrap_or(up)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(IdentityTables::embedded())
    }
}

/// Uppercase, fold diacritics, and collapse whitespace.
pub fn clean_name(raw: &str) -> String {
    let folded: String = raw.chars().map(fold_diacritic).collect();
    folded
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Synthesize a `FIRST.LAST` key from a cleaned display name. Apostrophes
/// and periods are dropped; hyphens survive ("MARC-ANDRE.FLEURY").
pub fn synthesize_key(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .map(|part| {
            part.chars()
                .filter(|c| *c != '\'' && *c != '.')
                .collect::<String>()
        })
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Fold the accented characters that actually show up in NHL rosters.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'å' | 'Á' | 'À' | 'Â' | 'Ä' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'ö' | 'ø' | 'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Ø' => 'O',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ý' | 'Ý' | 'ÿ' => 'Y',
        'č' | 'ç' | 'Č' | 'Ç' => 'C',
        'š' | 'Š' => 'S',
        'ž' | 'Ž' => 'Z',
        'ň' | 'ñ' | 'Ň' | 'Ñ' => 'N',
        'ř' | 'Ř' => 'R',
        'ť' | 'Ť' => 'T',
        'ď' | 'Ď' => 'D',
        'ľ' | 'ĺ' | 'Ľ' | 'Ĺ' | 'ł' | 'Ł' => 'L',
        other => other.to_ascii_uppercase(),
    }
}
