mod appdir;
mod arch;
mod config;
mod error;
mod image;
mod preflight;
mod tool;
mod ui;
mod unpack;
mod workspace;

use crate::appdir::{launcher, STACHER7};
use crate::arch::HostArch;
use crate::config::AppConfig;
use crate::error::{Failure, EXIT_OK};
use crate::ui::Answer;
use crate::workspace::Workspace;
use clap::Parser;
use colored::*;
use std::env;
use std::path::PathBuf;

/// Repackages the Stacher .deb found in the current directory into an AppImage.
#[derive(Parser)]
#[command(name = "stacher2appimage", version)]
#[command(about = "Repackage a Stacher .deb into a portable AppImage")]
struct Cli {}

fn run(cfg: &AppConfig) -> Result<Option<PathBuf>, Failure> {
    let layout = &STACHER7;
    let invocation_dir = env::current_dir()?;

    ui::step("Checking required tools...");
    preflight::check_required_tools(preflight::REQUIRED_TOOLS)?;
    let host = HostArch::detect()?;

    let package = preflight::find_input_package(&invocation_dir)?;
    let package_name = package.file_name().unwrap_or_default().to_string_lossy().to_string();
    ui::step(&format!("Found {}", package_name.bold()));

    let question = format!("Repackage {} into {}?", package_name, layout.image_name(&host.kernel));
    if ui::confirm(&question)? == Answer::No {
        return Err(Failure::Declined);
    }

    let tool = tool::ensure_tool(cfg, &cfg.tool_dir(&invocation_dir), &host, ui::confirm)?;

    // Every exit below this point releases the workspace when `ws` drops.
    let ws = Workspace::create(&package)?;

    let members = ui::with_spinner(format!("Unpacking {}...", package_name), || {
        unpack::extract_container(ws.package(), ws.path())
    })?;

    let control = unpack::extract_control(&members, ws.path())?;
    let declared = arch::declared_arch_from_file(&control)?;
    arch::verify(&declared, &host)?;
    ui::step(&format!("Architecture {} matches this host", declared.green()));

    ui::with_spinner("Extracting application files...", || {
        unpack::extract_payload(&members, ws.path())
    })?;

    ui::step(&format!("Assembling {}", layout.appdir_name()));
    let appdir = appdir::assemble(layout, ws.path(), &ws.join(layout.appdir_name()))?;
    launcher::configure(&appdir, layout)?;

    ui::step("Building AppImage...");
    let image = image::build_image(&tool, &appdir.root, &invocation_dir, layout, &host)?;
    Ok(image)
}

fn report(failure: &Failure) {
    if failure.is_user_abort() {
        println!("{} {}", "Aborted:".yellow().bold(), failure);
        return;
    }

    match failure {
        Failure::Unexpected(e) => ui::error(&format!("{:#}", e)),
        other => ui::error(&other.to_string()),
    }

    match failure {
        Failure::MissingDependencies(missing) => {
            for t in missing {
                ui::hint(&format!("{} (install: {})", t.command, t.package));
            }
            ui::hint(&format!("Try: {}", preflight::install_hint(missing)));
        }
        Failure::NoInput(_) => {
            ui::hint("Download the Stacher .deb package and place it in this directory.");
        }
        Failure::AmbiguousInput(_) => {
            ui::hint("Keep exactly one stacher*.deb in this directory and run again.");
        }
        Failure::UnsupportedHost(_) => {
            let supported: Vec<&str> = arch::ARCH_TABLE.iter().map(|(k, _)| *k).collect();
            ui::hint(&format!("Supported hosts: {}", supported.join(", ")));
        }
        Failure::ArchMismatch { host, .. } => {
            ui::hint(&format!("Download the {} build of the package instead.", host));
        }
        Failure::ToolAcquisition { .. } => {
            ui::hint(&format!(
                "Download the {} AppImage for your architecture manually from {} into this directory.",
                tool::TOOL_NAME,
                tool::RELEASES_PAGE
            ));
        }
        _ => {}
    }
}

fn main() {
    let _cli = Cli::parse();
    let cfg = AppConfig::load();

    let code = match run(&cfg) {
        Ok(image) => {
            match image {
                Some(path) => ui::success(&format!("Created {}", path.display())),
                None => ui::success("Packaging tool finished."),
            }
            EXIT_OK
        }
        Err(failure) => {
            report(&failure);
            failure.exit_code()
        }
    };

    if !error::is_known_exit_code(code) {
        ui::bug_report(code);
    }
    std::process::exit(code);
}
