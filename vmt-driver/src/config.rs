use anyhow::{bail, Context, Result};
use hack_asm::parser::is_symbol;
use std::path::Path;
use vmt_codegen::TranslatorOptions;
use vmt_frontend::MAX_CONSTANT;

/// Load translator options from a JSON file; missing fields keep their defaults
pub fn load_options(path: &Path) -> Result<TranslatorOptions> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let options: TranslatorOptions = serde_json::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    validate_options(&options).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(options)
}

/// Reject options the bootstrap could not encode
pub fn validate_options(options: &TranslatorOptions) -> Result<()> {
    if options.stack_base > MAX_CONSTANT {
        bail!("stack_base {} exceeds {}", options.stack_base, MAX_CONSTANT);
    }
    if !is_symbol(&options.entry_point) {
        bail!("entry_point '{}' is not a valid function name", options.entry_point);
    }
    Ok(())
}

/// Save translator options as pretty-printed JSON
pub fn save_options(options: &TranslatorOptions, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(options)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vmt.json");
        std::fs::write(&path, r#"{ "stack_base": 512 }"#).unwrap();

        let options = load_options(&path).unwrap();
        assert_eq!(options.stack_base, 512);
        assert_eq!(options.entry_point, "Sys.init");
        assert!(options.annotate);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vmt.json");
        let options = TranslatorOptions {
            entry_point: "Main.main".to_string(),
            annotate: false,
            ..TranslatorOptions::default()
        };
        save_options(&options, &path).unwrap();
        assert_eq!(load_options(&path).unwrap(), options);
    }

    #[test]
    fn test_stack_base_must_fit_an_a_instruction() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vmt.json");
        std::fs::write(&path, r#"{ "stack_base": 40000 }"#).unwrap();
        let err = load_options(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("stack_base 40000 exceeds 32767"));

        let options = TranslatorOptions {
            stack_base: 32767,
            ..TranslatorOptions::default()
        };
        assert!(validate_options(&options).is_ok());
    }

    #[test]
    fn test_entry_point_must_be_a_symbol() {
        let options = TranslatorOptions {
            entry_point: "1init".to_string(),
            ..TranslatorOptions::default()
        };
        assert!(validate_options(&options).is_err());
    }

    #[test]
    fn test_malformed_config_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ stack_base").unwrap();
        let err = load_options(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));
    }
}
