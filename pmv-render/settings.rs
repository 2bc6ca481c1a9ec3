use crate::SettingsError;

/// Contents of `pmv.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    /// Namespace of the inspected library's types.
    pub namespace: String,
    /// Printers that should not be used.
    pub disabled: Vec<String>,
    /// How deep the host expands children.
    pub max_depth: usize,
    /// How many children of one value the host shows.
    pub max_children: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            namespace: String::from("pattern_matcher"),
            disabled: Vec::new(),
            max_depth: 3,
            max_children: 200,
        }
    }
}

pub fn parse_settings(input: &str) -> Result<RenderSettings, SettingsError> {
    let toml: toml_edit::DocumentMut = input.parse()?;
    parse_settings_document(&toml)
}

pub fn parse_settings_document(
    toml: &toml_edit::DocumentMut,
) -> Result<RenderSettings, SettingsError> {
    let mut settings = RenderSettings::default();

    for (key, item) in toml.as_table() {
        match key {
            "printers" => {
                let table = item
                    .as_table()
                    .ok_or_else(|| SettingsError::ExpectedTable(key.to_owned()))?;
                parse_printers_table(table, &mut settings)?;
            }
            "display" => {
                let table = item
                    .as_table()
                    .ok_or_else(|| SettingsError::ExpectedTable(key.to_owned()))?;
                parse_display_table(table, &mut settings)?;
            }
            _ => return Err(SettingsError::UnknownKey(key.to_owned())),
        }
    }

    Ok(settings)
}

fn parse_printers_table(
    table: &toml_edit::Table,
    settings: &mut RenderSettings,
) -> Result<(), SettingsError> {
    for (key, item) in table {
        match key {
            "namespace" => {
                let Some(value) = item.as_str() else {
                    return Err(SettingsError::ExpectedString(format!("printers.{key}")));
                };
                settings.namespace = value.to_owned();
            }
            "disable" => {
                let list = item
                    .as_array()
                    .ok_or_else(|| SettingsError::ExpectedStringArray(format!("printers.{key}")))?;
                settings.disabled = list
                    .iter()
                    .map(|v| v.as_str().map(str::to_owned))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| SettingsError::ExpectedStringArray(format!("printers.{key}")))?;
            }
            _ => return Err(SettingsError::UnknownKey(format!("printers.{key}"))),
        }
    }
    Ok(())
}

fn parse_display_table(
    table: &toml_edit::Table,
    settings: &mut RenderSettings,
) -> Result<(), SettingsError> {
    for (key, item) in table {
        let slot = match key {
            "max-depth" => &mut settings.max_depth,
            "max-children" => &mut settings.max_children,
            _ => return Err(SettingsError::UnknownKey(format!("display.{key}"))),
        };
        *slot = item
            .as_integer()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| SettingsError::ExpectedInteger(format!("display.{key}")))?;
    }
    Ok(())
}
