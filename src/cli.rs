use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use ZapCampaigns::models::{CampaignStatus, GroupSettings};
use ZapCampaigns::services::{CampaignSort, GroupSort};

#[derive(Parser)]
#[command(name = "zapcampaigns")]
#[command(about = "Manage WhatsApp instances, templates, groups and campaigns")]
#[command(version)]
pub struct Cli {
    /// Configuration file, without extension
    #[arg(long, short = 'c', env = "ZAPCAMPAIGNS_CONFIG", default_value = "config")]
    pub config: String,

    /// Where the login session is kept
    #[arg(long, env = "ZAPCAMPAIGNS_SESSION", default_value = ".zapcampaigns-session.json")]
    pub session: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in to the backend and keep the session
    Login {
        username: String,

        #[arg(long, env = "ZAPCAMPAIGNS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// Check the backend and report service health
    Health,
    /// Instance commands
    Instances {
        #[command(subcommand)]
        instances_cmd: InstanceCommand,
    },
    /// Template commands
    Templates {
        #[command(subcommand)]
        templates_cmd: TemplateCommand,
    },
    /// Group commands
    Groups {
        #[command(subcommand)]
        groups_cmd: GroupCommand,
    },
    /// Campaign commands
    Campaigns {
        #[command(subcommand)]
        campaigns_cmd: CampaignCommand,
    },
    /// Send messages right away
    Send {
        #[command(subcommand)]
        send_cmd: SendCommand,
    },
    /// Poke the backend scheduler periodically
    Trigger {
        /// Fire a single poke and exit
        #[arg(long)]
        once: bool,
    },
}

#[derive(Subcommand)]
pub enum InstanceCommand {
    /// List instances
    List,
    /// Register a new instance
    Save {
        name: String,
        /// Gateway URL of the instance
        url: String,
        #[arg(long, env = "ZAPCAMPAIGNS_INSTANCE_KEY", hide_env_values = true)]
        api_key: String,
    },
    /// Delete an instance
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum TemplateCommand {
    /// List templates
    List {
        /// Case-insensitive name filter
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// Show one template
    Show { id: String },
    /// Create a template from a JSON file (`{name, description, messages}`)
    Save { file: PathBuf },
    /// Replace a template with the contents of a JSON file
    Update { id: String, file: PathBuf },
    /// Save a copy of an existing template
    Duplicate { id: String },
    /// Delete a template
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum GroupCommand {
    /// List the groups of an instance
    List {
        instance: String,
        #[arg(long, default_value = "")]
        filter: String,
        /// Only groups where the instance is admin
        #[arg(long)]
        admin_only: bool,
        #[arg(long, value_enum, default_value_t = GroupSortArg::Name)]
        sort: GroupSortArg,
    },
    /// Fetch the groups of every instance into the cache
    Preload,
    /// Group counts of an instance
    Stats { instance: String },
    /// Change the settings of one group
    Settings {
        instance: String,
        group: String,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Change the photo of one group
    Photo {
        instance: String,
        group: String,
        /// Image file
        file: PathBuf,
    },
    /// Print the invite link of a group
    Invite { instance: String, group: String },
    /// Apply the same settings, and optionally a photo, to many groups
    BulkUpdate {
        instance: String,
        #[arg(long = "groups", required_unless_present = "all", conflicts_with = "all", value_delimiter = ',')]
        groups: Vec<String>,
        /// Every group where the instance is admin
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        settings: SettingsArgs,
        /// Image file applied to every group
        #[arg(long)]
        photo: Option<PathBuf>,
    },
}

impl GroupCommand {
    /// Subcommands served from the group cache
    pub fn reads_cache(&self) -> bool {
        matches!(self, GroupCommand::Stats { .. } | GroupCommand::Settings { .. })
    }
}

/// Settings flags; anything left out keeps the base value
#[derive(clap::Args)]
pub struct SettingsArgs {
    /// Only admins may edit group info
    #[arg(long, value_name = "BOOL")]
    pub restrict: Option<bool>,
    /// Only admins may send messages
    #[arg(long, value_name = "BOOL")]
    pub announce: Option<bool>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

impl SettingsArgs {
    pub fn apply(self, base: GroupSettings) -> GroupSettings {
        GroupSettings {
            restrict: self.restrict.unwrap_or(base.restrict),
            announce: self.announce.unwrap_or(base.announce),
            description: self.description.or(base.description),
            name: self.name.or(base.name),
        }
    }
}

#[derive(Subcommand)]
pub enum CampaignCommand {
    /// List campaigns
    List {
        #[arg(long, default_value = "")]
        filter: String,
        /// pending, sent or error
        #[arg(long)]
        status: Option<CampaignStatus>,
        #[arg(long, value_enum, default_value_t = CampaignSortArg::ScheduledAt)]
        sort: CampaignSortArg,
    },
    /// Schedule a campaign
    Schedule {
        name: String,
        #[arg(long)]
        instance: String,
        #[arg(long)]
        template: String,
        #[arg(long = "groups", required = true, value_delimiter = ',')]
        groups: Vec<String>,
        /// Local date, YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Local time, HH:MM
        #[arg(long)]
        time: String,
    },
    /// Change fields of a campaign
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        instance: Option<String>,
        #[arg(long)]
        template: Option<String>,
        #[arg(long = "groups", value_delimiter = ',')]
        groups: Option<Vec<String>>,
        #[arg(long, requires = "time")]
        date: Option<String>,
        #[arg(long, requires = "date")]
        time: Option<String>,
    },
    /// Set the status of one campaign
    Status { id: String, status: CampaignStatus },
    /// Set the status of many campaigns
    BulkStatus {
        status: CampaignStatus,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Move many campaigns to the same date and time
    BulkReschedule {
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Schedule a copy of a campaign for tomorrow
    Duplicate { id: String },
    /// Delete a campaign
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum SendCommand {
    /// Send a message list to many groups in one call
    Bulk {
        instance: String,
        #[arg(long = "groups", required = true, value_delimiter = ',')]
        groups: Vec<String>,
        #[command(flatten)]
        messages: MessagesArgs,
        /// One call per group with a per-group report
        #[arg(long)]
        each: bool,
    },
    /// Send a message list to one group
    Messages {
        instance: String,
        group: String,
        #[command(flatten)]
        messages: MessagesArgs,
    },
    /// Send a single text message immediately
    Realtime {
        instance: String,
        group: String,
        text: String,
    },
    /// Upload a file to one or more groups
    Media {
        instance: String,
        #[arg(long = "groups", required = true, value_delimiter = ',')]
        groups: Vec<String>,
        file: PathBuf,
        #[arg(long, default_value = "")]
        caption: String,
    },
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
pub struct MessagesArgs {
    /// JSON file holding a message list
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Send the messages of a saved template
    #[arg(long)]
    pub template: Option<String>,
    /// Send a single text message
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum GroupSortArg {
    Name,
    Size,
}

impl From<GroupSortArg> for GroupSort {
    fn from(arg: GroupSortArg) -> Self {
        match arg {
            GroupSortArg::Name => GroupSort::Name,
            GroupSortArg::Size => GroupSort::Size,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CampaignSortArg {
    ScheduledAt,
    Name,
    Status,
}

impl From<CampaignSortArg> for CampaignSort {
    fn from(arg: CampaignSortArg) -> Self {
        match arg {
            CampaignSortArg::ScheduledAt => CampaignSort::ScheduledAt,
            CampaignSortArg::Name => CampaignSort::Name,
            CampaignSortArg::Status => CampaignSort::Status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_flags_overlay_the_current_group() {
        let cli = Cli::parse_from([
            "zapcampaigns", "groups", "settings", "i1", "g1", "--announce", "true", "--description", "Avisos",
        ]);
        let Command::Groups { groups_cmd: GroupCommand::Settings { settings, .. } } = cli.command else {
            panic!("parsed the wrong command");
        };

        let current = GroupSettings {
            restrict: true,
            announce: false,
            description: Some("Ofertas".to_string()),
            name: Some("Vendas".to_string()),
        };
        assert_eq!(
            settings.apply(current),
            GroupSettings {
                restrict: true,
                announce: true,
                description: Some("Avisos".to_string()),
                name: Some("Vendas".to_string()),
            }
        );
    }

    #[test]
    fn test_bulk_update_takes_groups_or_all() {
        assert!(Cli::try_parse_from(["zapcampaigns", "groups", "bulk-update", "i1", "--all"]).is_ok());
        assert!(Cli::try_parse_from(["zapcampaigns", "groups", "bulk-update", "i1", "--groups", "g1,g2"]).is_ok());
        assert!(Cli::try_parse_from(["zapcampaigns", "groups", "bulk-update", "i1"]).is_err());
        assert!(Cli::try_parse_from(["zapcampaigns", "groups", "bulk-update", "i1", "--all", "--groups", "g1"]).is_err());
    }
}
