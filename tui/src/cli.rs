use clap::Parser;

use crate::config::ConfigOverrides;

#[derive(Parser, Debug, Default)]
#[command(version)]
pub struct Cli {
    /// Placeholder shown while the composer is empty.
    #[arg(long)]
    pub placeholder: Option<String>,

    /// Name shown next to the messages you send.
    #[arg(long = "name", value_name = "NAME")]
    pub display_name: Option<String>,

    /// Browse only: messages cannot be sent, edited or deleted.
    #[arg(long = "read-only", default_value_t = false)]
    pub read_only: bool,

    /// Delete messages without asking for confirmation.
    #[arg(long = "no-confirm", default_value_t = false)]
    pub no_confirm: bool,
}

impl Cli {
    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            placeholder: self.placeholder.clone(),
            display_name: self.display_name.clone(),
            read_only: self.read_only,
            confirm_delete: self.no_confirm.then_some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_become_overrides() {
        let cli = Cli::parse_from([
            "huddle-tui",
            "--placeholder",
            "Say hi",
            "--name",
            "ada",
            "--read-only",
            "--no-confirm",
        ]);

        assert_eq!(
            cli.config_overrides(),
            ConfigOverrides {
                placeholder: Some("Say hi".to_string()),
                display_name: Some("ada".to_string()),
                read_only: true,
                confirm_delete: Some(false),
            }
        );
    }

    #[test]
    fn no_flags_leave_file_values_alone() {
        let cli = Cli::parse_from(["huddle-tui"]);
        assert_eq!(cli.config_overrides(), ConfigOverrides::default());
    }
}
