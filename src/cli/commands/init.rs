//! `csimport init` command - Initialize a new import workspace

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::identity::UserId;
use crate::core::password::{default_password, hash_password};
use crate::core::project::{Project, ProjectError};
use crate::core::store::{ImportStore, SqliteStore};
use crate::core::Config;
use crate::entities::{NewEntity, RoleName, User};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Create a first ADMIN account with this email and make it the operator
    #[arg(long, value_name = "EMAIL")]
    pub admin: Option<String>,

    /// Full name for the --admin account
    #[arg(long, value_name = "NAME", requires = "admin", default_value = "Administrator")]
    pub admin_name: String,

    /// Force initialization even if .csimport/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    let project = match project {
        Ok(project) => project,
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Import workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("csimport init --force").yellow());
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    let config = Config::load_for(Some(&project));
    let mut store = SqliteStore::open(&config.database_path(&project)).into_diagnostic()?;
    store.seed_roles().into_diagnostic()?;

    println!(
        "{} Initialized import workspace at {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!(
        "  {} roles seeded: {}",
        style("•").dim(),
        RoleName::allowed_list()
    );

    if let Some(email) = &args.admin {
        create_admin(&mut store, email, &args.admin_name)?;
        Config::save_operator(&project, email).into_diagnostic()?;
        println!(
            "  {} operator set to {}",
            style("•").dim(),
            style(email).cyan()
        );
    }

    println!();
    println!("Next steps:");
    println!("  {} Add a department", style("csimport ref dept \"Computer Science\"").yellow());
    println!("  {} Get an import template", style("csimport template subjects").yellow());
    println!("  {} Import a file", style("csimport import subjects subjects.csv").yellow());

    Ok(())
}

fn create_admin(store: &mut SqliteStore, email: &str, full_name: &str) -> Result<()> {
    if !email.contains('@') {
        return Err(miette::miette!("'{}' is not a valid email address", email));
    }

    if store.find_user_by_email(email).into_diagnostic()?.is_some() {
        println!(
            "  {} account {} already exists",
            style("•").dim(),
            style(email).cyan()
        );
        return Ok(());
    }

    let role_id = store
        .role_ids()
        .into_diagnostic()?
        .get(RoleName::Admin.as_str())
        .copied()
        .ok_or_else(|| miette::miette!("ADMIN role missing from store"))?;

    let admin = User {
        user_id: UserId::new(),
        email: email.to_string(),
        full_name: full_name.to_string(),
        password_hash: hash_password(&default_password(email)).into_diagnostic()?,
        role_id,
        dept_id: None,
        phone: None,
        is_active: true,
    };
    store.commit(&[NewEntity::User(admin)]).into_diagnostic()?;

    println!(
        "  {} created ADMIN {} (initial password: {}<name>)",
        style("•").dim(),
        style(email).cyan(),
        crate::core::password::DEFAULT_PASSWORD_PREFIX
    );
    Ok(())
}
