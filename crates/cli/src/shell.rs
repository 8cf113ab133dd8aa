//! Interactive dashboard shell
//!
//! Reads one command per line and parses it with clap, so `help` and
//! `<command> --help` come for free.

use anyhow::{Result, bail};
use authdash_core::Session;
use authdash_dashboard::{Confirmation, DashboardError, Notice, SessionController};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

const PROMPT: &str = "authdash> ";

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    disable_version_flag = true,
    help_template = "{subcommands}"
)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum ShellCommand {
    /// Log in with email and password
    Login {
        email: String,
        /// Prompted for when omitted
        password: Option<String>,
    },

    /// Create an account
    Register { email: String },

    /// Phone login with a one-time code
    Otp {
        #[command(subcommand)]
        command: OtpCommand,
    },

    /// List sessions
    Sessions,

    /// Revoke one session
    Revoke { session_id: String },

    /// Revoke every session, including this one
    RevokeAll {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Log out
    Logout,

    /// Get a new access token
    Refresh,

    /// Show the logged-in user
    Whoami,

    /// Change the avatar
    Avatar {
        #[command(subcommand)]
        command: AvatarCommand,
    },

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum OtpCommand {
    /// Send a code to a phone number
    Send { phone_number: String },
    /// Log in with the received code
    Verify { phone_number: String, otp: String },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum AvatarCommand {
    /// Pick a new random avatar
    Regenerate,
    /// Change the avatar style
    Style { style: String },
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Where password prompts read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretInput {
    /// The shell's own line input, for scripts and piped stdin
    Echoed,
    /// The controlling terminal with echo turned off
    Hidden,
}

impl SecretInput {
    pub const fn for_terminal(is_terminal: bool) -> Self {
        if is_terminal { Self::Hidden } else { Self::Echoed }
    }
}

/// Line-oriented front end for a [`SessionController`]
pub struct Shell<R, W> {
    controller: SessionController,
    input: Lines<R>,
    output: W,
    secrets: SecretInput,
}

impl<R: AsyncBufRead + Unpin, W: Write> Shell<R, W> {
    pub fn new(controller: SessionController, input: R, output: W) -> Self {
        Self {
            controller,
            input: input.lines(),
            output,
            secrets: SecretInput::Echoed,
        }
    }

    #[must_use]
    pub fn with_secret_input(mut self, secrets: SecretInput) -> Self {
        self.secrets = secrets;
        self
    }

    /// Run until `quit` or end of input
    pub async fn run(mut self) -> Result<()> {
        if self.controller.restore().await {
            writeln!(self.output, "{}", Notice::SessionRestored)?;
            self.print_whoami().await?;
        } else {
            writeln!(self.output, "Not logged in. Type `help` for commands.")?;
        }

        loop {
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;

            let Some(line) = self.input.next_line().await? else {
                break;
            };
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }

            match ShellLine::try_parse_from(words) {
                Ok(parsed) => {
                    if self.execute(parsed.command).await? == Flow::Quit {
                        break;
                    }
                }
                Err(error) => write!(self.output, "{}", error.render())?,
            }
        }

        Ok(())
    }

    async fn execute(&mut self, command: ShellCommand) -> Result<Flow> {
        let outcome = match command {
            ShellCommand::Login { email, password } => {
                let password = match password {
                    Some(password) => password,
                    None => self.ask_secret("Password").await?,
                };
                self.controller.login(&email, &password).await
            }
            ShellCommand::Register { email } => {
                let password = self.ask_secret("Password").await?;
                let confirm_password = self.ask_secret("Confirm password").await?;
                self.controller
                    .register(&email, &password, &confirm_password)
                    .await
            }
            ShellCommand::Otp { command } => match command {
                OtpCommand::Send { phone_number } => self.controller.send_otp(&phone_number).await,
                OtpCommand::Verify { phone_number, otp } => {
                    self.controller.verify_otp(&phone_number, &otp).await
                }
            },
            ShellCommand::Sessions => {
                match self.controller.fetch_sessions().await {
                    Ok(sessions) => self.print_sessions(&sessions)?,
                    Err(error) => self.print_error(&error)?,
                }
                return Ok(Flow::Continue);
            }
            ShellCommand::Revoke { session_id } => {
                self.controller.revoke_session(&session_id).await
            }
            ShellCommand::RevokeAll { yes } => {
                if self.controller.is_authenticated().await
                    && self.controller.sessions().await.is_empty()
                {
                    writeln!(self.output, "No sessions to revoke")?;
                    return Ok(Flow::Continue);
                }
                let confirmation = if yes {
                    Confirmation::Confirmed
                } else {
                    self.confirm("Revoke all sessions, including this one?")
                        .await?
                };
                self.controller.revoke_all_sessions(confirmation).await
            }
            ShellCommand::Logout => Ok(self.controller.logout().await),
            ShellCommand::Refresh => self.controller.refresh_access_token().await,
            ShellCommand::Whoami => {
                self.print_whoami().await?;
                return Ok(Flow::Continue);
            }
            ShellCommand::Avatar { command } => match command {
                AvatarCommand::Regenerate => self.controller.regenerate_avatar().await,
                AvatarCommand::Style { style } => self.controller.set_avatar_style(&style).await,
            },
            ShellCommand::Quit => return Ok(Flow::Quit),
        };

        match outcome {
            Ok(notice) => self.report(&notice).await?,
            Err(error) => self.print_error(&error)?,
        }
        Ok(Flow::Continue)
    }

    async fn report(&mut self, notice: &Notice) -> Result<()> {
        writeln!(self.output, "{notice}")?;
        match notice {
            Notice::LoggedIn
            | Notice::Registered
            | Notice::PhoneLoggedIn
            | Notice::SessionRestored
            | Notice::SessionRevoked { .. }
            | Notice::AllSessionsRevoked => {
                let sessions = self.controller.sessions().await;
                self.print_sessions(&sessions)
            }
            Notice::AvatarUpdated => self.print_whoami().await,
            Notice::OtpSent { .. } | Notice::LoggedOut => Ok(()),
        }
    }

    async fn ask(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        match self.input.next_line().await? {
            Some(line) => Ok(line.trim_end_matches('\r').to_string()),
            None => bail!("input closed"),
        }
    }

    async fn ask_secret(&mut self, label: &str) -> Result<String> {
        match self.secrets {
            SecretInput::Echoed => self.ask(label).await,
            SecretInput::Hidden => {
                self.output.flush()?;
                let prompt = format!("{label}: ");
                let secret =
                    tokio::task::spawn_blocking(move || rpassword::prompt_password(prompt))
                        .await??;
                Ok(secret)
            }
        }
    }

    async fn confirm(&mut self, question: &str) -> Result<Confirmation> {
        write!(self.output, "{question} [y/N] ")?;
        self.output.flush()?;
        let answer = self.input.next_line().await?.unwrap_or_default();
        Ok(Confirmation::from(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        )))
    }

    async fn print_whoami(&mut self) -> Result<()> {
        match self.controller.user().await {
            Some(user) => {
                writeln!(
                    self.output,
                    "Logged in as {} ({})",
                    user.display_name(),
                    user.role
                )?;
                if let (Some(style), Some(seed)) = (&user.avatar_style, &user.avatar_seed) {
                    writeln!(self.output, "Avatar: {style} / {seed}")?;
                }
            }
            None => writeln!(self.output, "Not logged in")?,
        }
        Ok(())
    }

    fn print_sessions(&mut self, sessions: &[Session]) -> Result<()> {
        if sessions.is_empty() {
            writeln!(self.output, "No sessions")?;
            return Ok(());
        }
        writeln!(self.output, "{}", render_sessions(sessions))?;
        Ok(())
    }

    fn print_error(&mut self, error: &DashboardError) -> Result<()> {
        writeln!(self.output, "Error: {}", error.user_message())?;
        Ok(())
    }
}

fn render_sessions(sessions: &[Session]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Device", "IP", "Created", "Status"]);

    for session in sessions {
        let status = match session.revoked_at {
            Some(revoked_at) => format!("revoked {}", revoked_at.format("%Y-%m-%d %H:%M")),
            None => "active".to_string(),
        };
        table.add_row(vec![
            session.id.clone(),
            session.user_agent.clone().unwrap_or_else(|| "-".into()),
            session.ip.clone().unwrap_or_else(|| "-".into()),
            session
                .created_at
                .map_or_else(|| "-".into(), |created| created.format("%Y-%m-%d %H:%M").to_string()),
            status,
        ]);
    }

    table
}
