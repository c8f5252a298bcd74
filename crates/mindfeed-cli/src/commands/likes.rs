use clap::Subcommand;
use mindfeed_core::LikeStore;

#[derive(Subcommand)]
pub enum LikesAction {
    /// List liked items as JSON
    List,
    /// Forget every liked item
    Clear,
}

pub fn run(action: LikesAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = LikeStore::open()?;
    match action {
        LikesAction::List => {
            let likes = store.load()?;
            println!("{}", serde_json::to_string_pretty(likes.items())?);
        }
        LikesAction::Clear => {
            store.clear()?;
            println!("likes cleared");
        }
    }
    Ok(())
}
