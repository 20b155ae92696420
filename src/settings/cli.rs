use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "lingolink", about = "Language-exchange backend")]
pub struct Cli {
    /// Settings file to load instead of the build-profile default.
    #[arg(long)]
    pub settings: Option<String>,
}
