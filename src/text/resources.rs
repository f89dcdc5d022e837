//! One-time provisioning of linguistic resources.
//!
//! Stop-word lists are loaded into a process-wide registry the first time a
//! language is requested. Lookup order is:
//!
//! 1. `<resource_dir>/corpora/stopwords/<language>` (NLTK data layout)
//! 2. lists bundled into the binary (NLTK lists, all supported languages)
//!
//! Provisioning is idempotent: once a language is loaded, later calls return
//! the cached list regardless of `resource_dir`. Call [`provision_all`] up
//! front when building encoders from several threads.

use crate::error::{EncoderError, Result};
use crate::text::{Language, StopWords};
use log::{info, warn};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

static REGISTRY: Lazy<Mutex<HashMap<Language, Arc<StopWords>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Returns the stop-word list compiled into the crate.
pub fn bundled_stopwords(language: Language) -> &'static str {
    match language {
        Language::Arabic => include_str!("../../resources/stopwords/arabic"),
        Language::Danish => include_str!("../../resources/stopwords/danish"),
        Language::Dutch => include_str!("../../resources/stopwords/dutch"),
        Language::English => include_str!("../../resources/stopwords/english"),
        Language::Finnish => include_str!("../../resources/stopwords/finnish"),
        Language::French => include_str!("../../resources/stopwords/french"),
        Language::German => include_str!("../../resources/stopwords/german"),
        Language::Greek => include_str!("../../resources/stopwords/greek"),
        Language::Hungarian => include_str!("../../resources/stopwords/hungarian"),
        Language::Italian => include_str!("../../resources/stopwords/italian"),
        Language::Norwegian => include_str!("../../resources/stopwords/norwegian"),
        Language::Portuguese => include_str!("../../resources/stopwords/portuguese"),
        Language::Romanian => include_str!("../../resources/stopwords/romanian"),
        Language::Russian => include_str!("../../resources/stopwords/russian"),
        Language::Spanish => include_str!("../../resources/stopwords/spanish"),
        Language::Swedish => include_str!("../../resources/stopwords/swedish"),
        Language::Tamil => include_str!("../../resources/stopwords/tamil"),
        Language::Turkish => include_str!("../../resources/stopwords/turkish"),
    }
}

/// Path of a language's stop-word file inside a resource directory.
pub fn stopwords_path(resource_dir: &Path, language: Language) -> PathBuf {
    resource_dir
        .join("corpora")
        .join("stopwords")
        .join(language.name())
}

/// Provisions the stop-word list for `language`.
///
/// Returns the cached list if the language was provisioned before.
pub fn provision(language: Language, resource_dir: Option<&Path>) -> Result<Arc<StopWords>> {
    let mut registry = lock_registry(&REGISTRY);

    if let Some(stop_words) = registry.get(&language) {
        return Ok(Arc::clone(stop_words));
    }

    let stop_words = Arc::new(load_stopwords(language, resource_dir)?);
    registry.insert(language, Arc::clone(&stop_words));
    Ok(stop_words)
}

/// Provisions several languages at once.
pub fn provision_all(languages: &[Language], resource_dir: Option<&Path>) -> Result<()> {
    for &language in languages {
        provision(language, resource_dir)?;
    }
    Ok(())
}

/// Returns true if `language` is already in the registry.
pub fn is_provisioned(language: Language) -> bool {
    lock_registry(&REGISTRY).contains_key(&language)
}

/// Locks a registry, recovering it if a holder panicked.
///
/// Entries are only inserted once fully loaded, so a poisoned map is still
/// consistent.
fn lock_registry<T>(registry: &Mutex<T>) -> MutexGuard<'_, T> {
    registry.lock().unwrap_or_else(|poisoned| {
        warn!("resource registry lock was poisoned; recovering");
        poisoned.into_inner()
    })
}

fn load_stopwords(language: Language, resource_dir: Option<&Path>) -> Result<StopWords> {
    if let Some(dir) = resource_dir {
        let path = stopwords_path(dir, language);
        if path.is_file() {
            let text = std::fs::read_to_string(&path).map_err(|e| {
                EncoderError::ResourceProvisioning(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let stop_words = StopWords::from_lines(language, &text);
            info!(
                "Provisioned {} stop words for {} from {}",
                stop_words.len(),
                language,
                path.display()
            );
            return Ok(stop_words);
        }
    }

    let stop_words = StopWords::from_lines(language, bundled_stopwords(language));
    info!(
        "Provisioned {} bundled stop words for {}",
        stop_words.len(),
        language
    );
    Ok(stop_words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_bundled_english() {
        let stop = provision(Language::English, None).unwrap();
        assert!(stop.contains("the"));
        assert!(stop.contains("do"));
        assert!(!stop.contains("not"));
        assert!(!stop.contains("no"));
        assert!(is_provisioned(Language::English));
    }

    #[test]
    fn test_provision_is_idempotent() {
        let a = provision(Language::French, None).unwrap();
        let b = provision(Language::French, None).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_unreadable_resource_fails() {
        let dir = tempdir().unwrap();
        let path = stopwords_path(dir.path(), Language::Tamil);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0xc3]).unwrap();

        let err = load_stopwords(Language::Tamil, Some(dir.path())).unwrap_err();
        assert!(matches!(err, EncoderError::ResourceProvisioning(_)));
    }

    #[test]
    fn test_resource_dir_list() {
        let dir = tempdir().unwrap();
        let path = stopwords_path(dir.path(), Language::Swedish);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "och\ndet\natt\nnot\n").unwrap();

        let stop = load_stopwords(Language::Swedish, Some(dir.path())).unwrap();
        assert!(stop.contains("och"));
        assert!(!stop.contains("not"));
        assert_eq!(stop.len(), 3);
    }

    #[test]
    fn test_every_language_has_bundled_list() {
        for language in Language::ALL {
            let stop = load_stopwords(language, None).unwrap();
            assert!(stop.len() > 20, "{language} list too short");
        }
        let swedish = load_stopwords(Language::Swedish, None).unwrap();
        assert!(swedish.contains("och"));
        assert!(!swedish.contains("not"));
    }

    #[test]
    fn test_every_language_provisions() {
        provision_all(&Language::ALL, None).unwrap();
        for language in Language::ALL {
            assert!(is_provisioned(language));
        }
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let registry: Mutex<HashMap<Language, usize>> = Mutex::new(HashMap::new());
        lock_registry(&registry).insert(Language::Danish, 94);

        let result = std::panic::catch_unwind(|| {
            let _guard = registry.lock().unwrap();
            panic!("holder panicked");
        });
        assert!(result.is_err());
        assert!(registry.is_poisoned());

        let guard = lock_registry(&registry);
        assert_eq!(guard.get(&Language::Danish), Some(&94));
    }

    #[test]
    fn test_bundled_spanish_keeps_no() {
        let stop = provision(Language::Spanish, None).unwrap();
        assert!(stop.contains("de"));
        assert!(!stop.contains("no"));
    }
}
