pub mod config;
pub mod feed;
pub mod interests;
pub mod likes;
pub mod policy;

use mindfeed_core::Event;

/// Print one event as a JSON line.
pub fn emit(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

pub fn emit_all<I>(events: I) -> Result<(), serde_json::Error>
where
    I: IntoIterator<Item = Event>,
{
    for event in events {
        emit(&event)?;
    }
    Ok(())
}
