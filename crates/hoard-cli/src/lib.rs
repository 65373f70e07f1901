// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use hoard_app::Variant;
use hoard_db::{ItemStore, WeaponStore};
use runtime::{ItemRuntime, WeaponRuntime};
use std::env;
use std::path::{Path, PathBuf};

/// Entry point shared by both binaries; exits 1 with the error chain on
/// failure.
pub fn main_for(variant: Variant) {
    if let Err(error) = run(variant, env::args().skip(1)) {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run<I, S>(variant: Variant, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let options = parse_cli_args(args, Config::default_path()?)?;
    if options.show_help {
        print_help(variant);
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `{} --print-example-config` to generate a v1 template",
            options.config_path.display(),
            binary_name(variant)
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    logging::init(&config)?;
    tracing::info!(
        variant = variant.as_str(),
        db = %db_path.display(),
        demo = options.demo,
        "starting"
    );

    match variant {
        Variant::Items => run_items(&options, &db_path),
        Variant::Weapons => run_weapons(&options, &config, &db_path),
    }
}

fn run_items(options: &CliOptions, db_path: &Path) -> Result<()> {
    let mut store = ItemStore::open(db_path).with_context(|| open_hint(db_path))?;
    store.bootstrap()?;
    if options.demo {
        store.seed_demo_data()?;
    }
    if options.check_only {
        println!("ok: {} items in {}", store.count()?, db_path.display());
        return Ok(());
    }

    hoard_tui::run_app(&mut ItemRuntime::new(&mut store))
}

fn run_weapons(options: &CliOptions, config: &Config, db_path: &Path) -> Result<()> {
    let mut store = WeaponStore::open(db_path).with_context(|| open_hint(db_path))?;
    store.bootstrap()?;
    if options.demo {
        store.seed_demo_data()?;
    }
    if options.check_only {
        println!("ok: {} weapons in {}", store.count()?, db_path.display());
        return Ok(());
    }

    hoard_tui::run_app(&mut WeaponRuntime::new(
        &mut store,
        config.export_settings(),
    ))
}

fn open_hint(db_path: &Path) -> String {
    format!(
        "open database {} -- if this path is wrong, set [storage].db_path or HOARD_DB_PATH",
        db_path.display()
    )
}

fn binary_name(variant: Variant) -> &'static str {
    match variant {
        Variant::Items => "hoard-items",
        Variant::Weapons => "hoard-weapons",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help(variant: Variant) {
    println!("{} ({})", binary_name(variant), variant.list_title());
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with seeded demo data (in-memory)");
    println!("  --check                  Open and validate the database, then exit");
    println!("  --help                   Show this help");
}
