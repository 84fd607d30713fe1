use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Do not contact the translation provider; missing translations stay missing
    #[arg(long)]
    pub offline: bool,

    /// Retrain the classifier even if the stored model is current
    #[arg(long)]
    pub retrain: bool,

    /// Texts to classify
    #[arg(value_name = "TEXT")]
    pub texts: Vec<String>,
}
