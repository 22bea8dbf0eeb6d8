//! Config subcommand handlers.

use std::fmt::Write as _;
use std::path::PathBuf;

use dialoguer::{Input, Select};

use hyypsync_api::AppPackage;
use hyypsync_config::{Config, Profile, store_token};
use hyypsync_core::StayMode;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with every secret masked, for display.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(MASK.into());
        }
        for code in profile.codes.values_mut() {
            MASK.clone_into(code);
        }
    }
    cfg
}

/// Format an already-redacted config as TOML-like text.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "refresh_interval = {}", cfg.defaults.refresh_interval);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "package = \"{}\"", p.package);
        let _ = writeln!(out, "stay_mode = \"{}\"", p.stay_mode);
        if let Some(ref token) = p.token {
            let _ = writeln!(out, "token = \"{token}\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(interval) = p.refresh_interval {
            let _ = writeln!(out, "refresh_interval = {interval}");
        }
        if let Some(ref fixture) = p.fixture {
            let _ = writeln!(out, "fixture = \"{}\"", fixture.display());
        }
        let mut codes: Vec<_> = p.codes.iter().collect();
        codes.sort();
        for (partition, code) in codes {
            let _ = writeln!(out, "codes.{partition} = \"{code}\"");
        }
        let mut stay: Vec<_> = p.stay_profiles.iter().collect();
        stay.sort();
        for (partition, profile) in stay {
            let _ = writeln!(out, "stay_profiles.{partition} = \"{profile}\"");
        }
    }

    out
}

/// Offer to store a token in the system keyring or return it for
/// plaintext config.
///
/// Returns `Some(token)` if the user chose plaintext, `None` if stored in
/// the keyring.
fn prompt_token_storage(token: &str, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        store_token(profile_name, token)?;
        eprintln!("   ✓ Token stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(token.to_owned()))
    }
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("hyypsync configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut cfg = config::load_config()?;

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    if cfg.profiles.contains_key(&profile_name)
        && !util::confirm(
            &format!("Profile '{profile_name}' exists. Overwrite?"),
            global.yes,
        )?
    {
        return Ok(());
    }

    let packages = [AppPackage::IdsHyyp, AppPackage::AdtSecureHome];
    let package_labels = &["IDS Hyyp", "ADT Secure Home"];
    let package = Select::new()
        .with_prompt("Which app is the account registered with?")
        .items(package_labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let stay_modes = [StayMode::Night, StayMode::Home];
    let stay_labels = &["Night", "Home"];
    let stay_mode = Select::new()
        .with_prompt("Show stay-arming as")
        .items(stay_labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let token =
        rpassword::prompt_password("Session token (empty to skip): ").map_err(prompt_err)?;
    let token = if token.is_empty() {
        None
    } else {
        prompt_token_storage(&token, &profile_name)?
    };

    let fixture: String = Input::new()
        .with_prompt("Fixture file (empty for none)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    let profile = Profile {
        package: packages.get(package).copied().unwrap_or_default(),
        stay_mode: stay_modes.get(stay_mode).copied().unwrap_or_default(),
        token,
        fixture: (!fixture.is_empty()).then(|| PathBuf::from(fixture)),
        ..Profile::default()
    };

    cfg.profiles.insert(profile_name.clone(), profile);
    if cfg.default_profile.is_none() || cfg.profiles.len() == 1 {
        cfg.default_profile = Some(profile_name.clone());
    }
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Profile: {profile_name}");
    eprintln!("\n  Test it: hyypsync status --profile {profile_name}");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config()?);
            let out = output::render_single(global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config()?;
            let name =
                profile.unwrap_or_else(|| cfg.active_profile_name(global.profile.as_deref()));
            let token = rpassword::prompt_password(format!("Session token for '{name}': "))
                .map_err(prompt_err)?;
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "token cannot be empty".into(),
                });
            }
            store_token(&name, &token)?;
            if !global.quiet {
                eprintln!("✓ Token stored in system keyring for profile '{name}'");
            }
            Ok(())
        }
    }
}
