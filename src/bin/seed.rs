use clap::Parser;

use personaserver::config::DEFAULT_DATABASE_URL;
use personaserver::db;
use personaserver::middleware::auth::{hash_password, AuthUser};
use personaserver::models::invitation::CreateInvitation;
use personaserver::models::journey::{
    Emotion, JourneyInput, JourneyState, JourneyStatus, Metrics, Stage, Touchpoint,
};
use personaserver::models::persona::{CustomSection, PersonaInput};
use personaserver::models::role::WorkspaceRole;
use personaserver::models::user::CreateUser;
use personaserver::models::workspace::CreateWorkspace;
use personaserver::service::WorkspaceService;

#[derive(Parser, Debug)]
#[command(author, version, about = "Seed a persona server database with demo data")]
struct Options {
    /// Database to seed (created and migrated if missing)
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Email of the demo owner; reused if it already exists
    #[arg(long, default_value = "demo@example.com")]
    email: String,

    /// Password for a newly created owner
    #[arg(long, default_value = "demo-password")]
    password: String,

    /// Name of the demo workspace
    #[arg(long, default_value = "Demo workspace")]
    workspace: String,

    /// Optional email to invite into the workspace as editor
    #[arg(long)]
    invite: Option<String>,
}

fn touchpoint(name: &str, emotion: Emotion, satisfaction: f64) -> Touchpoint {
    Touchpoint {
        id: String::new(),
        name: name.to_string(),
        description: String::new(),
        emotion,
        customer_action: None,
        customer_job: None,
        image: None,
        insights: None,
        metrics: Some(Metrics {
            satisfaction,
            effort: 50.0,
            completion: 100.0,
        }),
        feedback: None,
    }
}

fn stage(name: &str, order: i64, touchpoints: Vec<Touchpoint>) -> Stage {
    Stage {
        id: String::new(),
        name: name.to_string(),
        order,
        touchpoints,
        position: None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "personaserver=info".into()),
        )
        .init();

    let options = Options::parse();
    let pool = db::create_pool(&options.database_url).await?;

    let user = match db::users::find_user_by_email(&pool, &options.email).await? {
        Some(user) => user,
        None => {
            let password_hash = hash_password(&options.password)?;
            db::users::create_user(
                &pool,
                &CreateUser {
                    email: options.email.clone(),
                    display_name: Some("Demo owner".to_string()),
                },
                Some(&password_hash),
            )
            .await?
        }
    };
    let auth = AuthUser {
        user_id: user.id.clone(),
        email: user.email.clone(),
    };

    let service = WorkspaceService::sqlite(pool.clone());
    let workspace = service
        .create_workspace(
            &auth,
            &CreateWorkspace {
                name: options.workspace.clone(),
                description: Some("Seeded personas and journeys".to_string()),
            },
        )
        .await?;

    let persona = db::personas::create_persona(
        &pool,
        &workspace.id,
        &user.id,
        &PersonaInput {
            name: "Dana the designer".to_string(),
            age: "34".to_string(),
            occupation: "Product designer".to_string(),
            goals: vec!["Ship polished features quickly".to_string()],
            pain_points: vec!["Slow review cycles".to_string()],
            custom_sections: vec![CustomSection {
                title: "Tools".to_string(),
                items: vec!["Figma".to_string(), "Notion".to_string()],
            }],
            avatar: String::new(),
        },
    )
    .await?;

    let journey_input = JourneyInput {
        name: "First week onboarding".to_string(),
        description: "From sign-up to the first shared persona".to_string(),
        cover_image: None,
        persona_ids: vec![persona.id.clone()],
        state: Some(JourneyState::Current),
        status: JourneyStatus::Active,
        stages: vec![
            stage(
                "Discover",
                0,
                vec![touchpoint("Landing page", Emotion::Positive, 80.0)],
            ),
            stage(
                "Sign up",
                1,
                vec![touchpoint("Email confirmation", Emotion::Negative, 35.0)],
            ),
        ],
    }
    .normalized()?;
    let journey =
        db::journeys::create_journey(&pool, &workspace.id, &user.id, &journey_input).await?;

    if let Some(email) = options.invite {
        let invitation = service
            .invite_member(
                &auth,
                &workspace.id,
                &CreateInvitation {
                    email,
                    role: WorkspaceRole::Editor,
                },
            )
            .await?;
        eprintln!("  invitation   {} ({})", invitation.id, invitation.email);
    }

    let token = db::tokens::issue_token(&pool, &user.id, 30).await?;

    eprintln!();
    eprintln!("  owner        {} ({})", user.email, user.id);
    eprintln!("  workspace    {}", workspace.id);
    eprintln!("  persona      {}", persona.id);
    eprintln!("  journey      {}", journey.id);
    eprintln!("  token        {token}");
    eprintln!();

    Ok(())
}
