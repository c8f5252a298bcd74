use clap::Subcommand;
use mindfeed_core::feed::{random_interests, seeded_interests, AVAILABLE_INTERESTS};
use mindfeed_core::{Config, InterestSet};

#[derive(Subcommand)]
pub enum InterestsAction {
    /// Show selected and available topics
    Show,
    /// Replace the selection
    Set {
        /// Comma-separated topics (e.g. "nature,office")
        topics: String,
    },
    /// Clear the selection
    Clear,
    /// Pick a random selection from the catalog
    Random {
        /// Seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
    },
}

pub fn run(action: InterestsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    match action {
        InterestsAction::Show => {
            let out = serde_json::json!({
                "selected": config.interests,
                "available": AVAILABLE_INTERESTS,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }
        InterestsAction::Set { topics } => {
            let interests = InterestSet::parse_list(&topics);
            for topic in interests.topics() {
                if !AVAILABLE_INTERESTS.contains(&topic.as_str()) {
                    tracing::warn!(%topic, "topic is not in the catalog");
                }
            }
            save(&mut config, &interests)?;
        }
        InterestsAction::Clear => save(&mut config, &InterestSet::default())?,
        InterestsAction::Random { seed } => {
            let interests = match seed {
                Some(seed) => seeded_interests(seed),
                None => random_interests(&mut rand::thread_rng()),
            };
            save(&mut config, &interests)?;
        }
    }
    println!("{}", serde_json::to_string(&config.interests)?);
    Ok(())
}

fn save(config: &mut Config, interests: &InterestSet) -> Result<(), Box<dyn std::error::Error>> {
    config.interests = interests.topics().to_vec();
    config.save()?;
    Ok(())
}
