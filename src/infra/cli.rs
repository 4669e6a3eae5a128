use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Shop backend REST server")]
pub struct Cli {
    /// Promote the user profile with this email to the admin role before serving.
    #[arg(long, value_name = "EMAIL")]
    pub grant_admin: Option<String>,
}
