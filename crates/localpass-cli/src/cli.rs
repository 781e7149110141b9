//! Command-line surface.
//!
//! Secrets can be passed as flags but are better supplied through the
//! `LOCALPASS_*` environment variables, whose values clap never echoes.
//! None of these types implement `Debug`, so they cannot end up in logs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use zeroize::Zeroize;

use localpass_vault::{CardInput, ExportSections, LoginInput, NoteInput};

/// Local, multi-user secrets manager.
#[derive(Parser)]
#[command(name = "localpass", version, about)]
pub struct Cli {
    /// Directory holding the store and `preferences.json`.
    #[arg(long, env = "LOCALPASS_DATA_DIR", default_value = ".", global = true)]
    pub data_dir: PathBuf,

    /// Static field-encryption key (16, 24 or 32 bytes).
    #[arg(
        long,
        env = "LOCALPASS_ENCRYPTION_KEY",
        hide_env_values = true,
        global = true
    )]
    pub encryption_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Username and master password of the acting user.
#[derive(Clone, Args)]
pub struct Credentials {
    #[arg(long, env = "LOCALPASS_USER")]
    pub user: String,

    #[arg(long, env = "LOCALPASS_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an account.
    Register(RegisterArgs),
    /// List account names.
    Users,
    /// Check credentials and print the account.
    Login(Credentials),
    /// Delete an account and everything it owns.
    DeleteAccount(Credentials),
    /// Show an account's security questions.
    Questions {
        #[arg(long)]
        user: String,
    },
    /// Reset a forgotten password with the security answers.
    Recover(RecoverArgs),
    /// Manage saved logins.
    Logins {
        #[command(flatten)]
        auth: Credentials,
        #[command(subcommand)]
        action: LoginAction,
    },
    /// Manage secure notes.
    Notes {
        #[command(flatten)]
        auth: Credentials,
        #[command(subcommand)]
        action: NoteAction,
    },
    /// Manage payment cards.
    Cards {
        #[command(flatten)]
        auth: Credentials,
        #[command(subcommand)]
        action: CardAction,
    },
    /// Write an encrypted backup file.
    Export(ExportArgs),
    /// Restore sections from an encrypted backup file.
    Import(ImportArgs),
    /// Generate a random password.
    Generate(GenerateArgs),
    /// Report on the strength of saved login passwords.
    Health(Credentials),
    /// Show or change `preferences.json`.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub auth: Credentials,
    #[arg(long)]
    pub question1: String,
    #[arg(long, env = "LOCALPASS_ANSWER1", hide_env_values = true)]
    pub answer1: String,
    #[arg(long)]
    pub question2: String,
    #[arg(long, env = "LOCALPASS_ANSWER2", hide_env_values = true)]
    pub answer2: String,
}

#[derive(Args)]
pub struct RecoverArgs {
    #[arg(long)]
    pub user: String,
    #[arg(long, env = "LOCALPASS_ANSWER1", hide_env_values = true)]
    pub answer1: String,
    #[arg(long, env = "LOCALPASS_ANSWER2", hide_env_values = true)]
    pub answer2: String,
    #[arg(long, env = "LOCALPASS_NEW_PASSWORD", hide_env_values = true)]
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Record actions
// ---------------------------------------------------------------------------

#[derive(Clone, Args)]
pub struct LoginFields {
    #[arg(long)]
    pub service: String,
    #[arg(long)]
    pub username: String,
    /// Stored password; empty when omitted.
    #[arg(long)]
    pub secret: Option<String>,
}

impl From<LoginFields> for LoginInput {
    fn from(f: LoginFields) -> Self {
        Self {
            service: f.service,
            username: f.username,
            password: f.secret,
        }
    }
}

#[derive(Subcommand)]
pub enum LoginAction {
    Add(LoginFields),
    List,
    Update {
        id: i64,
        #[command(flatten)]
        fields: LoginFields,
    },
    Delete {
        id: i64,
    },
}

#[derive(Clone, Args)]
pub struct NoteFields {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub content: String,
}

impl From<NoteFields> for NoteInput {
    fn from(f: NoteFields) -> Self {
        Self {
            title: f.title,
            content: f.content,
        }
    }
}

#[derive(Subcommand)]
pub enum NoteAction {
    Add(NoteFields),
    List,
    Update {
        id: i64,
        #[command(flatten)]
        fields: NoteFields,
    },
    Delete {
        id: i64,
    },
}

#[derive(Clone, Args)]
pub struct CardFields {
    #[arg(long)]
    pub cardholder_name: String,
    #[arg(long)]
    pub card_number: String,
    #[arg(long)]
    pub expiry_month: String,
    #[arg(long)]
    pub expiry_year: String,
    #[arg(long)]
    pub cvv: String,
    /// Display gradient; only used when adding.
    #[arg(long, default_value = "linear-gradient(135deg, #667eea 0%, #764ba2 100%)")]
    pub gradient: String,
}

impl From<CardFields> for CardInput {
    fn from(f: CardFields) -> Self {
        Self {
            cardholder_name: f.cardholder_name,
            card_number: f.card_number,
            expiry_month: f.expiry_month,
            expiry_year: f.expiry_year,
            cvv: f.cvv,
            gradient: f.gradient,
        }
    }
}

#[derive(Subcommand)]
pub enum CardAction {
    Add(CardFields),
    List,
    Update {
        id: i64,
        #[command(flatten)]
        fields: CardFields,
    },
    Delete {
        id: i64,
    },
}

// ---------------------------------------------------------------------------
// Backup and tools
// ---------------------------------------------------------------------------

#[allow(clippy::struct_excessive_bools)]
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub auth: Credentials,
    /// Include saved logins.
    #[arg(long)]
    pub vault: bool,
    /// Include secure notes.
    #[arg(long)]
    pub notes: bool,
    /// Include payment cards.
    #[arg(long)]
    pub cards: bool,
    /// Include every section.
    #[arg(long, conflicts_with_all = ["vault", "notes", "cards"])]
    pub all: bool,
    /// Passphrase protecting the backup file.
    #[arg(long, env = "LOCALPASS_BACKUP_PASSPHRASE", hide_env_values = true)]
    pub passphrase: String,
    /// Output file; defaults to a dated name in the backup directory.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    #[must_use]
    pub const fn sections(&self) -> ExportSections {
        if self.all {
            ExportSections::ALL
        } else {
            ExportSections {
                vault: self.vault,
                notes: self.notes,
                cards: self.cards,
            }
        }
    }
}

#[derive(Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub auth: Credentials,
    /// Backup file written by `export`.
    pub file: PathBuf,
    #[arg(long, env = "LOCALPASS_BACKUP_PASSPHRASE", hide_env_values = true)]
    pub passphrase: String,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Args)]
pub struct GenerateArgs {
    /// Length in characters; defaults to the preference.
    #[arg(long, short)]
    pub length: Option<usize>,
    #[arg(long)]
    pub no_uppercase: bool,
    #[arg(long)]
    pub no_lowercase: bool,
    #[arg(long)]
    pub no_digits: bool,
    #[arg(long)]
    pub no_symbols: bool,
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective preferences.
    Show,
    /// Change preferences; unset flags keep their current value.
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// Store file name, relative to the data directory unless absolute.
    #[arg(long)]
    pub database_file: Option<String>,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[arg(long)]
    pub log_filter: Option<String>,
    /// Directory for exports without `--output`.
    #[arg(long)]
    pub backup_dir: Option<PathBuf>,
    /// Export next to the store again.
    #[arg(long, conflicts_with = "backup_dir")]
    pub clear_backup_dir: bool,
    #[arg(long)]
    pub generator_length: Option<usize>,
    #[arg(long)]
    pub generator_uppercase: Option<bool>,
    #[arg(long)]
    pub generator_lowercase: Option<bool>,
    #[arg(long)]
    pub generator_digits: Option<bool>,
    #[arg(long)]
    pub generator_symbols: Option<bool>,
}
