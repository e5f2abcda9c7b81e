//! LMS CLI - Command-line front-end for the LMS
//!
//! Logs in against the LMS REST API, keeps the session between runs and
//! exposes the admin, teacher and student dashboards as subcommands.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use lms_client::{
    ApiError, ClientContext, Course, GuardDecision, Navigation, NewCourse, NewUser, NewZoomLink,
    UserUpdate,
};
use lms_core::{
    init_logging, log_operation_error, log_operation_start, performance, LmsConfig, LmsError,
    LoggingConfig, Role, View,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// Read when `--password` is not given
const PASSWORD_ENV: &str = "LMS_PASSWORD";

#[derive(Parser)]
#[command(name = "lms")]
#[command(about = "Command-line client for the LMS")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and keep the session for later commands
    Login {
        /// Account email; defaults to the remembered one
        #[arg(short, long)]
        email: Option<String>,

        /// Password; falls back to $LMS_PASSWORD, then a prompt
        #[arg(short, long)]
        password: Option<String>,

        /// Remember the email for the next login; without it any
        /// remembered email is forgotten
        #[arg(long)]
        remember: bool,
    },

    /// Forget the current session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Resolve a front-end path against the current session
    Open {
        /// e.g. /admin-dashboard
        path: String,
    },

    /// Check that the API server is reachable
    Ping,

    /// Admin dashboard
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },

    /// Teacher dashboard
    Teacher {
        #[command(subcommand)]
        command: TeacherCommand,
    },

    /// Student dashboard
    Student {
        #[command(subcommand)]
        command: StudentCommand,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Register a new account
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// admin, teacher or student
        #[arg(long, default_value = "teacher")]
        role: Role,
    },

    ListUsers,

    UpdateUser {
        id: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },

    DeleteUser {
        id: String,
    },
}

#[derive(Subcommand)]
enum TeacherCommand {
    /// List your courses with their zoom links
    Courses,

    CreateCourse {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: String,
    },

    AddZoomLink {
        course_id: String,
        /// RFC 3339 date, e.g. 2024-03-01T09:00:00Z
        #[arg(long)]
        date: DateTime<Utc>,
        #[arg(long)]
        link: String,
    },

    UpdateZoomLink {
        course_id: String,
        link_id: String,
        #[arg(long)]
        date: DateTime<Utc>,
        #[arg(long)]
        link: String,
    },

    DeleteZoomLink {
        course_id: String,
        link_id: String,
    },
}

#[derive(Subcommand)]
enum StudentCommand {
    /// Courses you are enrolled in
    Courses,

    /// Courses open for enrolment
    Available,

    Details {
        course_id: String,
    },

    Enroll {
        course_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `config --init` must work before any file exists
    let mut config = match &cli.command {
        Commands::Config { init: true, .. } => LmsConfig::default(),
        _ => LmsConfig::load(cli.config.as_deref()).context("Failed to load configuration")?,
    };

    let mut logging_config: LoggingConfig = config.logging.clone();
    if cli.verbose {
        logging_config.level = "debug".to_string();
    }
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    config.logging = logging_config;

    info!("Starting LMS CLI v{}", env!("CARGO_PKG_VERSION"));

    let outcome = match cli.command {
        Commands::Config { show, init } => return handle_config(&config, cli.config, show, init),
        Commands::Login {
            email,
            password,
            remember,
        } => handle_login(&client(&config)?, email, password, remember).await,
        Commands::Logout => {
            client(&config)?.session.logout();
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => handle_whoami(&client(&config)?),
        Commands::Open { path } => handle_open(&client(&config)?, &path),
        Commands::Ping => handle_ping(&client(&config)?).await,
        Commands::Admin { command } => handle_admin(&client(&config)?, command).await,
        Commands::Teacher { command } => handle_teacher(&client(&config)?, command).await,
        Commands::Student { command } => handle_student(&client(&config)?, command).await,
    };

    if let Some(hint) = outcome.as_ref().err().and_then(failure_hint) {
        eprintln!("{}", hint);
    }
    outcome
}

/// Follow-up advice printed under an error, if any applies
fn failure_hint(error: &anyhow::Error) -> Option<&'static str> {
    if error
        .downcast_ref::<ApiError>()
        .is_some_and(ApiError::requires_login)
    {
        return Some("Please log in again with `lms login`");
    }
    if error
        .downcast_ref::<LmsError>()
        .is_some_and(LmsError::is_recoverable)
    {
        return Some("This may be temporary; try again");
    }
    None
}

fn client(config: &LmsConfig) -> Result<ClientContext> {
    ClientContext::from_config(config).context("Failed to set up the client")
}

fn handle_config(config: &LmsConfig, path: Option<PathBuf>, show: bool, init: bool) -> Result<()> {
    if init {
        let path = path.unwrap_or_else(LmsConfig::default_path);
        LmsConfig::default()
            .save_to_file(&path)
            .context("Failed to write configuration")?;
        println!("✅ Configuration initialized at: {}", path.display());
    }

    if show || !init {
        println!("{}", toml::to_string_pretty(config)?);
    }

    Ok(())
}

async fn handle_login(
    ctx: &ClientContext,
    email: Option<String>,
    password: Option<String>,
    remember: bool,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => match ctx.remembered_email.get()? {
            Some(email) => {
                println!("Using remembered email {}", email);
                email
            }
            None => prompt("Email: ")?,
        },
    };

    let password = match password.or_else(|| std::env::var(PASSWORD_ENV).ok()) {
        Some(password) => password,
        None => prompt("Password: ")?,
    };

    log_operation_start!("login", email = %email);
    let session = performance::measure_async("login", ctx.session.login(&email, &password))
        .await
        .inspect_err(|e| {
            log_operation_error!("login", e);
        })?;

    ctx.remembered_email.update(&email, remember)?;

    println!(
        "✅ Logged in as {} ({})",
        session.username(),
        session.role()
    );
    println!("Home: {}", session.role().dashboard().path());
    Ok(())
}

fn handle_whoami(ctx: &ClientContext) -> Result<()> {
    match ctx.session.current_session() {
        Some(session) => {
            println!("{} <{}>", session.username(), session.email());
            println!("role: {}", session.role());
            println!("id:   {}", session.id());
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

fn handle_open(ctx: &ClientContext, path: &str) -> Result<()> {
    match ctx.navigator.navigate(path) {
        Navigation::Render(view) => println!("render {}", view.path()),
        Navigation::Redirect(view) => println!("redirect {}", view.path()),
        Navigation::NotFound => bail!("No page at {}", path),
    }
    Ok(())
}

async fn handle_ping(ctx: &ClientContext) -> Result<()> {
    let body = ctx.dashboards.client().ping().await?;
    let message = body
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("connected");
    println!("✅ {}", message);
    Ok(())
}

async fn handle_admin(ctx: &ClientContext, command: AdminCommand) -> Result<()> {
    let admin = match ctx.dashboards.admin() {
        Ok(admin) => admin,
        Err(decision) => return report_redirect(View::AdminDashboard, decision),
    };

    match command {
        AdminCommand::CreateUser {
            username,
            email,
            password,
            role,
        } => {
            admin
                .create_user(&NewUser::new(username, email.clone(), password).with_role(role))
                .await?;
            println!("✅ Created {} account for {}", role, email);
        }
        AdminCommand::ListUsers => {
            for user in admin.list_users().await? {
                println!("{:<26} {:<8} {} <{}>", user.id, user.role, user.username, user.email);
            }
        }
        AdminCommand::UpdateUser {
            id,
            username,
            email,
            password,
            role,
        } => {
            let update = UserUpdate {
                username,
                email,
                password,
                role,
            };
            if update.is_empty() {
                bail!("Nothing to update");
            }
            admin.update_user(&id, &update).await?;
            println!("✅ Updated user {}", id);
        }
        AdminCommand::DeleteUser { id } => {
            admin.delete_user(&id).await?;
            println!("✅ Deleted user {}", id);
        }
    }
    Ok(())
}

async fn handle_teacher(ctx: &ClientContext, command: TeacherCommand) -> Result<()> {
    let teacher = match ctx.dashboards.teacher() {
        Ok(teacher) => teacher,
        Err(decision) => return report_redirect(View::TeacherDashboard, decision),
    };

    match command {
        TeacherCommand::Courses => {
            let courses = teacher.list_courses().await?;
            print_courses(&courses, true);
        }
        TeacherCommand::CreateCourse { name, code } => {
            teacher
                .create_course(&NewCourse {
                    course_name: name,
                    course_code: code.clone(),
                })
                .await?;
            println!("✅ Created course {}", code);
        }
        TeacherCommand::AddZoomLink {
            course_id,
            date,
            link,
        } => {
            teacher
                .add_zoom_link(&course_id, &NewZoomLink { date, link })
                .await?;
            println!("✅ Added zoom link to {}", course_id);
        }
        TeacherCommand::UpdateZoomLink {
            course_id,
            link_id,
            date,
            link,
        } => {
            teacher
                .update_zoom_link(&course_id, &link_id, &NewZoomLink { date, link })
                .await?;
            println!("✅ Updated zoom link {}", link_id);
        }
        TeacherCommand::DeleteZoomLink { course_id, link_id } => {
            teacher.delete_zoom_link(&course_id, &link_id).await?;
            println!("✅ Deleted zoom link {}", link_id);
        }
    }
    Ok(())
}

async fn handle_student(ctx: &ClientContext, command: StudentCommand) -> Result<()> {
    let student = match ctx.dashboards.student() {
        Ok(student) => student,
        Err(decision) => return report_redirect(View::StudentDashboard, decision),
    };

    match command {
        StudentCommand::Courses => print_courses(&student.my_courses().await?, true),
        StudentCommand::Available => print_courses(&student.available_courses().await?, false),
        StudentCommand::Details { course_id } => {
            print_courses(&[student.course_details(&course_id).await?], true)
        }
        StudentCommand::Enroll { course_id } => {
            student.enroll(&course_id).await?;
            println!("✅ Enrolled in {}", course_id);
        }
    }
    Ok(())
}

/// The guard refused; tell the user where the front-end would go instead
fn report_redirect(view: View, decision: GuardDecision) -> Result<()> {
    debug!(view = %view, ?decision, "Dashboard refused");
    match decision {
        GuardDecision::RedirectToLogin => {
            bail!("Not logged in. Run `lms login` first")
        }
        GuardDecision::RedirectTo(home) => {
            bail!("{} is not available to you; redirecting to {}", view.path(), home.path())
        }
        GuardDecision::Render => Ok(()),
    }
}

fn print_courses(courses: &[Course], with_links: bool) {
    if courses.is_empty() {
        println!("No courses");
        return;
    }

    for course in courses {
        println!(
            "{:<26} {:<10} {} (teacher: {})",
            course.id,
            course.course_code,
            course.course_name,
            course.teacher_name().unwrap_or("-")
        );
        if with_links {
            for link in &course.zoom_links {
                println!(
                    "    {}  {}  {}",
                    link.id.as_deref().unwrap_or("-"),
                    link.date.format("%Y-%m-%d %H:%M UTC"),
                    link.link
                );
            }
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        bail!("No input given");
    }
    Ok(value)
}
