use anyhow::{Context, Result};
use markdown_mindmap_config::Config;
use markdown_mindmap_engine::{ConvertOptions, MarkdownFile, MindMap, Node, convert, io};
use relative_path::RelativePathBuf;
use std::{
    env,
    path::{Path, PathBuf},
    process,
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut json = false;
    let mut h1_root = false;
    let mut path: Option<PathBuf> = None;

    for arg in &args[1..] {
        match arg.as_str() {
            "--json" => json = true,
            "--h1-root" => h1_root = true,
            other if other.starts_with("--") => usage(&args[0]),
            other => {
                if path.replace(PathBuf::from(other)).is_some() {
                    usage(&args[0]);
                }
            }
        }
    }

    let Some(path) = path else {
        usage(&args[0]);
    };

    let options = ConvertOptions {
        use_first_heading_as_root: h1_root || configured_h1_root(),
    };

    if path.is_dir() {
        let files = io::scan_markdown_files(&path)?;
        for file in files {
            let map = convert_file(&file, options)?;
            if json {
                let entry = serde_json::json!({
                    "file": file.display().to_string(),
                    "map": map,
                });
                println!("{entry}");
            } else {
                println!("== {}", file.display());
                print_outline(&map.root, 0);
            }
        }
    } else {
        let map = convert_file(&path, options)?;
        print_map(&map, json)?;
    }

    Ok(())
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <file-or-folder> [--json] [--h1-root]");
    eprintln!("  --json     print the hand-off JSON instead of an outline");
    eprintln!("  --h1-root  use the first H1 heading as the root node");
    process::exit(1);
}

/// The configured default for H1-as-root; a broken config file is logged
/// and ignored.
fn configured_h1_root() -> bool {
    match Config::load() {
        Ok(Some(config)) => config.use_first_heading_as_root,
        Ok(None) => false,
        Err(e) => {
            log::warn!("ignoring unreadable config: {e}");
            false
        }
    }
}

fn convert_file(path: &Path, options: ConvertOptions) -> Result<MindMap> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string());

    let relative = RelativePathBuf::from(&name);
    let content = io::read_file(&relative, dir)
        .with_context(|| format!("reading {}", path.display()))?;

    let file = MarkdownFile::new(relative);
    Ok(convert(&content, file.display_name(), options))
}

fn print_map(map: &MindMap, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(map)?);
    } else {
        print_outline(&map.root, 0);
    }
    Ok(())
}

fn print_outline(node: &Node, depth: usize) {
    println!("{}- {}", "  ".repeat(depth), node.topic);
    for child in &node.children {
        print_outline(child, depth + 1);
    }
}
