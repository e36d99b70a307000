use std::error::Error;
use std::{ fs, path::Path };
use serde_json::{ Value, Map };
use anyhow::{ Context, Result };

fn main() -> Result<(), Box<dyn Error>> {
    let messages_dir = Path::new(&std::env::var("CARGO_MANIFEST_DIR")?).join("messages");
    let out_path = Path::new(&std::env::var("OUT_DIR")?).join("all_translations.json");

    println!("cargo:rerun-if-changed=messages");

    // Always create the file, even if empty, so include_str! works
    if !messages_dir.exists() {
        println!("cargo:warning=No messages/ folder found, bundling an empty catalog");
        fs::write(out_path, "{}")?;
        return Ok(());
    }

    let translations = build_translations(&messages_dir)?;
    fs::write(out_path, serde_json::to_string_pretty(&translations)?)?;
    Ok(())
}

// messages/<lang>/<section>.json -> { lang: { section: <json> } }
fn build_translations(messages_dir: &Path) -> Result<Value> {
    let mut translations = Map::new();

    for lang_entry in fs::read_dir(messages_dir)? {
        let lang_dir = lang_entry?;
        if !lang_dir.file_type()?.is_dir() {
            continue;
        }

        let lang_code = lang_dir.file_name().to_string_lossy().to_string();
        let mut sections = Map::new();

        for file_entry in fs::read_dir(lang_dir.path())? {
            let file_path = file_entry?.path();

            if let Some("json") = file_path.extension().and_then(|e| e.to_str()) {
                let Some(section) = file_path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };

                let content = fs::read_to_string(&file_path)?;
                let json: Value = serde_json
                    ::from_str(&content)
                    .with_context(|| format!("invalid JSON in {}", file_path.display()))?;
                sections.insert(section.to_string(), json);
            }
        }
        translations.insert(lang_code, Value::Object(sections));
    }

    Ok(Value::Object(translations))
}
