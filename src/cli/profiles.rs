//! Profiles subcommand implementation.
//!
//! Handles the `apklens profiles` command for managing scan profiles.

use crate::config::{Profile, ProfileManager};
use crate::error::CliResult;
use crate::output;
use clap::{Parser, Subcommand};

/// Manage scan profiles.
#[derive(Parser, Debug)]
pub struct ProfilesCommand {
    #[command(subcommand)]
    pub action: ProfilesAction,
}

/// Profile management actions.
#[derive(Subcommand, Debug)]
pub enum ProfilesAction {
    /// List all available profiles
    List,

    /// Show details of a specific profile
    Show {
        /// Profile name
        name: String,
    },

    /// Create a new profile
    Create {
        /// Profile name
        name: String,

        /// Analysis depth (quick, standard, deep)
        #[arg(long, default_value = "standard")]
        depth: String,

        /// Concurrency level
        #[arg(short, long, default_value = "8")]
        concurrency: usize,

        /// Skip library inference
        #[arg(long = "no-libs")]
        no_libraries: bool,

        /// Skip permission extraction
        #[arg(long = "no-permissions")]
        no_permissions: bool,

        /// Maximum number of files a directory may expand to
        #[arg(long, default_value = "10000")]
        max_files: usize,

        /// Abort on the first failed package
        #[arg(long)]
        fail_fast: bool,

        /// Profile description
        #[arg(short = 'd', long)]
        description: Option<String>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

impl ProfilesCommand {
    /// Execute the profiles command.
    pub fn execute(&self, _verbose: bool, quiet: bool) -> CliResult<()> {
        match &self.action {
            ProfilesAction::List => self.list_profiles(quiet),
            ProfilesAction::Show { name } => self.show_profile(name, quiet),
            ProfilesAction::Create {
                name,
                depth,
                concurrency,
                no_libraries,
                no_permissions,
                max_files,
                fail_fast,
                description,
            } => self.create_profile(
                name,
                depth,
                *concurrency,
                !*no_libraries,
                !*no_permissions,
                *max_files,
                *fail_fast,
                description.as_deref(),
                quiet,
            ),
            ProfilesAction::Delete { name, yes } => self.delete_profile(name, *yes, quiet),
        }
    }

    fn list_profiles(&self, quiet: bool) -> CliResult<()> {
        let manager = ProfileManager::new()?;
        let profiles = manager.list();

        if profiles.is_empty() {
            if !quiet {
                println!("No profiles found.");
            }
            return Ok(());
        }

        if !quiet {
            println!(
                "\n{:<15} {:<10} {:<6} {:<6} {}",
                "NAME", "DEPTH", "CONC", "LIBS", "DESCRIPTION"
            );
            println!("{}", "-".repeat(70));
        }

        for profile in profiles {
            let desc = if profile.description.chars().count() > 34 {
                let head: String = profile.description.chars().take(34).collect();
                format!("{}...", head)
            } else {
                profile.description.clone()
            };

            println!(
                "{:<15} {:<10} {:<6} {:<6} {}",
                profile.name,
                profile.depth,
                profile.concurrency,
                if profile.infer_libraries { "yes" } else { "no" },
                desc
            );
        }

        if !quiet {
            println!();
        }

        Ok(())
    }

    fn show_profile(&self, name: &str, _quiet: bool) -> CliResult<()> {
        let manager = ProfileManager::new()?;
        let profile = manager
            .get(name)
            .ok_or_else(|| crate::error::CliError::Other(format!("profile '{}' not found", name)))?;

        println!("\nProfile: {}", profile.name);
        println!("{}", "=".repeat(40));
        println!("Description:  {}", profile.description);
        println!("Depth:        {}", profile.depth);
        println!("Concurrency:  {}", profile.concurrency);
        println!(
            "Libraries:    {}",
            if profile.infer_libraries { "yes" } else { "no" }
        );
        println!(
            "Permissions:  {}",
            if profile.read_permissions { "yes" } else { "no" }
        );
        println!("Max Files:    {}", profile.max_files);
        println!(
            "Fail Fast:    {}",
            if profile.fail_fast { "yes" } else { "no" }
        );
        println!();

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn create_profile(
        &self,
        name: &str,
        depth: &str,
        concurrency: usize,
        infer_libraries: bool,
        read_permissions: bool,
        max_files: usize,
        fail_fast: bool,
        description: Option<&str>,
        quiet: bool,
    ) -> CliResult<()> {
        let mut manager = ProfileManager::new()?;

        let profile = Profile {
            name: name.to_string(),
            description: description.unwrap_or("").to_string(),
            depth: depth.to_string(),
            concurrency,
            infer_libraries,
            read_permissions,
            max_files,
            fail_fast,
        };

        manager.create(profile)?;

        if !quiet {
            output::print_success(&format!("Profile '{}' created successfully", name));
        }

        Ok(())
    }

    fn delete_profile(&self, name: &str, yes: bool, quiet: bool) -> CliResult<()> {
        let mut manager = ProfileManager::new()?;

        // Verify profile exists
        if manager.get(name).is_none() {
            return Err(crate::error::CliError::Other(format!(
                "profile '{}' not found",
                name
            )));
        }

        // Confirm deletion
        if !yes {
            println!("Delete profile '{}'? [y/N] ", name);
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        }

        manager.delete(name)?;

        if !quiet {
            output::print_success(&format!("Profile '{}' deleted", name));
        }

        Ok(())
    }
}
