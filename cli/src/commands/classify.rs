use anyhow::Result;

use azmigrate::Settings;

use crate::cli::ClassifyArgs;

use super::load_classifier;

pub fn run(settings: &Settings, args: &ClassifyArgs) -> Result<()> {
    let classifier = load_classifier(settings)?;
    let candidates = classifier.classify(&args.id)?;

    if candidates.is_empty() {
        log::warn!("No resource type matches {}", args.id);
    }
    for candidate in candidates {
        println!("{}", candidate);
        if args.example {
            if let Some(example) = classifier.table().example_for(&candidate) {
                println!("{}", example.trim_end());
            }
        }
    }
    Ok(())
}
