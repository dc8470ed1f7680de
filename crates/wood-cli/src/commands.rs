use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use tracing::debug;
use wood_diff::{ChangeSet, Comparison, DeletedOptions, NewOptions};
use wood_snapshot::{Manifest, Scanner};
use wood_sync::{BucketSyncer, DirectoryBackend, InMemoryBackend, SyncConfig, SyncReport, Syncer};
use wood_types::Entity;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let scanner = Scanner::with_excludes(config.exclude.iter().cloned());
    match cli.command {
        Command::Snapshot(args) => cmd_snapshot(args, &scanner),
        Command::Tree(args) => cmd_tree(args, &scanner, cli.format),
        Command::Diff(args) => cmd_diff(args, &scanner, cli.format),
        Command::Invalidations(args) => cmd_invalidations(args, &scanner, cli.format),
        Command::Sync(args) => cmd_sync(args, &scanner, &config, cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SyncConfig> {
    match path {
        Some(path) => SyncConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(SyncConfig::default()),
    }
}

/// A `.json` file is read as a manifest; anything else is scanned.
fn load_source(path: &Path, scanner: &Scanner) -> anyhow::Result<Entity> {
    let is_manifest = path.is_file() && path.extension().is_some_and(|ext| ext == "json");
    if is_manifest {
        debug!(path = %path.display(), "loading manifest");
        let manifest = Manifest::load(path)
            .with_context(|| format!("failed to load manifest {}", path.display()))?;
        Ok(manifest.root)
    } else {
        scanner
            .scan_root(path)
            .with_context(|| format!("failed to scan {}", path.display()))
    }
}

fn load_pair(args: &PairArgs, scanner: &Scanner) -> anyhow::Result<(Entity, Entity)> {
    Ok((load_source(&args.left, scanner)?, load_source(&args.right, scanner)?))
}

fn cmd_snapshot(args: SnapshotArgs, scanner: &Scanner) -> anyhow::Result<()> {
    let root = scanner
        .scan_root(&args.dir)
        .with_context(|| format!("failed to scan {}", args.dir.display()))?;
    let files = root.walk_files().len();
    let manifest = Manifest::new(root);
    match &args.output {
        Some(path) => {
            manifest.save(path)?;
            println!(
                "{} Snapshot of {} files written to {}",
                "✓".green().bold(),
                files.to_string().bold(),
                path.display()
            );
        }
        None => println!("{}", manifest.to_json()?),
    }
    Ok(())
}

fn cmd_tree(args: TreeArgs, scanner: &Scanner, format: OutputFormat) -> anyhow::Result<()> {
    let root = load_source(&args.source, scanner)?;
    match format {
        OutputFormat::Text => print!("{}", root.hierarchy()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&root)?),
    }
    Ok(())
}

fn diff_options(args: &DiffArgs) -> (NewOptions, DeletedOptions) {
    (
        NewOptions {
            include_intermediates: !args.no_intermediates,
        },
        DeletedOptions {
            include_children: !args.no_children,
            include_directories: !args.no_directories,
        },
    )
}

fn cmd_diff(args: DiffArgs, scanner: &Scanner, format: OutputFormat) -> anyhow::Result<()> {
    let (left, right) = load_pair(&args.pair, scanner)?;
    let comparison = Comparison::compare(Some(&left), Some(&right))?;
    if args.tree {
        print!("{}", comparison.hierarchy());
        return Ok(());
    }
    let (new_opts, deleted_opts) = diff_options(&args);
    let changes = ChangeSet::from_comparison(&comparison, &args.base, new_opts, deleted_opts);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&changes)?),
        OutputFormat::Text => print!("{}", render_changes(&changes)),
    }
    Ok(())
}

fn render_changes(changes: &ChangeSet) -> String {
    if changes.is_empty() {
        return "No changes.\n".to_string();
    }
    let mut out = String::new();
    for path in &changes.new {
        out.push_str(&format!("{} {}\n", "+".green().bold(), path.green()));
    }
    for path in &changes.modified {
        out.push_str(&format!("{} {}\n", "~".yellow().bold(), path.yellow()));
    }
    for path in &changes.deleted {
        out.push_str(&format!("{} {}\n", "-".red().bold(), path.red()));
    }
    out
}

fn cmd_invalidations(args: PairArgs, scanner: &Scanner, format: OutputFormat) -> anyhow::Result<()> {
    let (left, right) = load_pair(&args, scanner)?;
    let comparison = Comparison::compare(Some(&left), Some(&right))?;
    let prefixes: Vec<String> = comparison.invalidations().collect();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&prefixes)?),
        OutputFormat::Text if prefixes.is_empty() => println!("Nothing to invalidate."),
        OutputFormat::Text => {
            for prefix in &prefixes {
                println!("{}", prefix.cyan());
            }
        }
    }
    Ok(())
}

fn cmd_sync(
    args: SyncArgs,
    scanner: &Scanner,
    config: &SyncConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let right = scanner
        .scan_root(&args.source)
        .with_context(|| format!("failed to scan {}", args.source.display()))?;
    let current = args.dest.join(config.key_prefix.trim_matches('/'));
    let left = if current.is_dir() {
        scanner.scan_root(&current)?
    } else {
        Entity::root(Vec::new())
    };
    let comparison = Comparison::compare(Some(&left), Some(&right))?;

    let runtime = tokio::runtime::Runtime::new()?;
    let report = if args.dry_run {
        let syncer = BucketSyncer::new(InMemoryBackend::new(), &args.source, config)?;
        let report = runtime.block_on(syncer.sync(&comparison))?;
        if format == OutputFormat::Text {
            let backend = syncer.backend();
            for key in backend.delete_batches().into_iter().flatten() {
                println!("{} {}", "-".red().bold(), key.red());
            }
            for key in backend.deleted_directories() {
                println!("{} {}", "-".red().bold(), key.red());
            }
            for key in backend.directories() {
                println!("{} {}", "+".green().bold(), key.green());
            }
            for (_, key) in backend.uploads() {
                println!("{} {}", "+".green().bold(), key.green());
            }
        }
        report
    } else {
        let backend = DirectoryBackend::new(&args.dest);
        let syncer = BucketSyncer::new(backend, &args.source, config)?;
        runtime.block_on(syncer.sync(&comparison))?
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report, args.dry_run),
    }
    Ok(())
}

fn print_report(report: &SyncReport, dry_run: bool) {
    let verb = if dry_run { "Would sync" } else { "Synced" };
    println!(
        "{} {}: {} uploaded, {} directories created, {} deleted in {} requests, {} directories removed",
        "✓".green().bold(),
        verb,
        report.uploaded.to_string().bold(),
        report.directories,
        report.deleted.to_string().bold(),
        report.delete_requests,
        report.directories_deleted
    );
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;

    use super::*;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn manifest_and_directory_sources_agree() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "site/index.html", "hi");
        write(dir.path(), "site/css/s.css", "body");
        let scanner = Scanner::new();
        let scanned = load_source(&dir.path().join("site"), &scanner).unwrap();

        let manifest_path = dir.path().join("snap.json");
        Manifest::new(scanned.clone()).save(&manifest_path).unwrap();
        let loaded = load_source(&manifest_path, &scanner).unwrap();
        assert_eq!(scanned, loaded);
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_source(&dir.path().join("absent"), &Scanner::new()).is_err());
    }

    #[test]
    fn diff_flags_map_to_options() {
        let cli = Cli::try_parse_from(["wood", "diff", "a", "b", "--no-intermediates", "--no-children"])
            .unwrap();
        let Command::Diff(args) = cli.command else { panic!("wrong command") };
        let (new_opts, deleted_opts) = diff_options(&args);
        assert!(!new_opts.include_intermediates);
        assert!(!deleted_opts.include_children);
        assert!(deleted_opts.include_directories);
    }

    #[test]
    fn render_marks_each_kind() {
        colored::control::set_override(false);
        let changes = ChangeSet {
            new: vec!["a".into()],
            modified: vec!["b".into()],
            deleted: vec!["c".into()],
            invalidations: Vec::new(),
        };
        assert_eq!(render_changes(&changes), "+ a\n~ b\n- c\n");
        assert_eq!(render_changes(&ChangeSet::default()), "No changes.\n");
    }

    #[test]
    fn config_file_is_optional() {
        assert_eq!(load_config(None).unwrap(), SyncConfig::default());
    }

    #[test]
    fn sync_mirrors_source_into_dest() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write(source.path(), "index.html", "new");
        write(source.path(), "css/s.css", "body");
        write(dest.path(), "stale.html", "old");

        let args = SyncArgs {
            source: source.path().to_path_buf(),
            dest: dest.path().to_path_buf(),
            dry_run: false,
        };
        cmd_sync(args, &Scanner::new(), &SyncConfig::default(), OutputFormat::Json).unwrap();

        let mirrored = Scanner::new().scan_root(dest.path()).unwrap();
        let expected = Scanner::new().scan_root(source.path()).unwrap();
        assert_eq!(mirrored, expected);
    }

    #[test]
    fn sync_carries_empty_directories_and_type_swaps() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write(source.path(), "x", "file");
        fs::create_dir(source.path().join("keep")).unwrap();
        fs::create_dir(dest.path().join("x")).unwrap();
        write(dest.path(), "keep/old.txt", "old");
        fs::create_dir(dest.path().join("gone")).unwrap();

        let args = SyncArgs {
            source: source.path().to_path_buf(),
            dest: dest.path().to_path_buf(),
            dry_run: false,
        };
        cmd_sync(args, &Scanner::new(), &SyncConfig::default(), OutputFormat::Json).unwrap();

        let mirrored = Scanner::new().scan_root(dest.path()).unwrap();
        let expected = Scanner::new().scan_root(source.path()).unwrap();
        assert_eq!(mirrored, expected);
    }

    #[test]
    fn dry_run_leaves_dest_untouched() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write(source.path(), "index.html", "new");
        write(dest.path(), "stale.html", "old");

        let args = SyncArgs {
            source: source.path().to_path_buf(),
            dest: dest.path().to_path_buf(),
            dry_run: true,
        };
        cmd_sync(args, &Scanner::new(), &SyncConfig::default(), OutputFormat::Json).unwrap();
        assert!(dest.path().join("stale.html").exists());
        assert!(!dest.path().join("index.html").exists());
    }
}
