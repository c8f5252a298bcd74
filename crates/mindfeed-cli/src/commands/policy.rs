use clap::Subcommand;
use mindfeed_core::pacing::format_countdown;
use mindfeed_core::{Config, Mode, ModePolicy};

#[derive(Subcommand)]
pub enum PolicyAction {
    /// Show the effective pacing policy
    Show {
        /// Mode to show (both when omitted)
        mode: Option<Mode>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: PolicyAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    match action {
        PolicyAction::Show { mode, json } => {
            let modes = match mode {
                Some(mode) => vec![mode],
                None => vec![Mode::Mindful, Mode::Unrestricted],
            };
            for mode in modes {
                let policy = config.policy(mode)?;
                if json {
                    let out = serde_json::json!({ "mode": mode, "policy": policy });
                    println!("{}", serde_json::to_string(&out)?);
                } else {
                    print_policy(mode, &policy, mode == config.mode);
                }
            }
        }
    }
    Ok(())
}

fn print_policy(mode: Mode, policy: &ModePolicy, active: bool) {
    let marker = if active { " (active)" } else { "" };
    println!("{mode}{marker}");
    match policy.item_count_threshold {
        Some(count) => println!("  item threshold: {count}"),
        None => println!("  item threshold: unbounded"),
    }
    match policy.time_threshold_ms {
        Some(ms) => println!("  time threshold: {}", format_countdown(ms)),
        None => println!("  time threshold: unbounded"),
    }
    println!("  break duration: {}", format_countdown(policy.break_duration_ms));
}
