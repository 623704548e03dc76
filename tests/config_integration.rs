use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tomo_core::TomoError;
use tomo_core::config::{DEFAULT_NOTEBOOKS, TomoConfig};

#[test]
fn toml_round_trip_keeps_every_field() -> Result<(), TomoError> {
    let config = TomoConfig::new("/srv/cuadernos");

    let raw = config.to_toml_string()?;
    let back = TomoConfig::from_toml_str(&raw)?;

    assert_eq!(back, config);
    Ok(())
}

#[test]
fn missing_keys_fall_back_to_defaults() -> Result<(), TomoError> {
    let config = TomoConfig::from_toml_str(
        r#"
        data_dir = "/tmp/tomos"
        sheet_name = "Seguimiento"
        "#,
    )?;

    assert_eq!(config.data_dir, PathBuf::from("/tmp/tomos"));
    assert_eq!(config.sheet_name, "Seguimiento");
    assert_eq!(config.database_file, "cuadernos.db");
    assert_eq!(config.notebooks.len(), DEFAULT_NOTEBOOKS.len());
    assert_eq!(
        config.database_path(),
        PathBuf::from("/tmp/tomos/cuadernos.db")
    );
    Ok(())
}

#[test]
fn invalid_config_is_reported() {
    assert!(matches!(
        TomoConfig::from_toml_str("data_dir = ["),
        Err(TomoError::Config(_))
    ));
    assert!(matches!(
        TomoConfig::from_toml_str("notebooks = []"),
        Err(TomoError::Config(_))
    ));
    assert!(matches!(
        TomoConfig::from_toml_str(r#"ledger_file = " ""#),
        Err(TomoError::Config(_))
    ));
}

#[test]
fn catalog_rejects_bad_notebook_names() {
    let mut config = TomoConfig::new("/tmp");

    config.notebooks = vec!["Maule".into(), "Maule".into()];
    assert!(matches!(config.catalog(), Err(TomoError::Config(_))));

    config.notebooks = vec!["Norte/Sur".into()];
    assert!(matches!(config.catalog(), Err(TomoError::Config(_))));
}

#[test]
fn custom_catalog_resolves_its_own_names() -> Result<(), TomoError> {
    let mut config = TomoConfig::new("/tmp");
    config.notebooks = vec!["Norte".into(), " Sur ".into()];
    config.themes = vec!["Obras".into(), "  ".into()];

    let catalog = config.catalog()?;

    assert_eq!(catalog.resolve("Sur")?.as_str(), "Sur");
    assert!(matches!(
        catalog.resolve("Maule"),
        Err(TomoError::UnknownNotebook(_))
    ));
    assert_eq!(catalog.themes(), ["Obras".to_string()]);
    Ok(())
}

#[test]
fn load_reads_file_and_creates_data_dir() -> Result<(), TomoError> {
    let tmpdir = TempDir::new()?;
    let data_dir = tmpdir.path().join("datos");
    let file = tmpdir.path().join("tomo.toml");

    let config = TomoConfig::new(&data_dir);
    fs::write(&file, config.to_toml_string()?)?;

    let loaded = TomoConfig::load(&file)?;
    loaded.ensure_data_dir()?;

    assert!(data_dir.is_dir());
    assert_eq!(loaded.workbook_path(), data_dir.join("seguimiento_regional.xlsx"));
    Ok(())
}
