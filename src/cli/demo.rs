//! Demo command - runs one account through its whole lifecycle in memory

use clap::Args;
use tracing::info;

use crate::domain::token::TokenResponse;
use crate::infrastructure::user::UserService;

#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Email to register
    #[arg(long)]
    pub email: String,

    /// Password to register and log in with
    #[arg(long)]
    pub password: String,
}

/// What a demo run produced
#[derive(Debug)]
pub struct DemoOutcome {
    pub user_id: String,
    pub token: TokenResponse,
    pub public_key_xml: String,
}

/// Run the demo command
pub async fn run(args: DemoArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let service = crate::build_user_service(&config)?;

    let outcome = execute(&service, &args.email, &args.password).await?;

    println!("user id:    {}", outcome.user_id);
    println!("token:      {}", serde_json::to_string_pretty(&outcome.token)?);
    println!("public key: {}", outcome.public_key_xml);
    Ok(())
}

/// Register, log in, validate the token, then delete the account
pub async fn execute(
    service: &UserService,
    email: &str,
    password: &str,
) -> anyhow::Result<DemoOutcome> {
    let user_id = service.add_user(email, password).await?;
    info!(user_id = %user_id, "Registered");

    let token = service.login(email, password).await?;
    let claims = service.validate_token(&token.value).await?;
    anyhow::ensure!(
        claims.user_id() == user_id.as_str(),
        "token subject {} does not match {}",
        claims.user_id(),
        user_id
    );

    let public_key_xml = service.public_key(user_id.as_str()).await?;

    service.delete_user(user_id.as_str(), password).await?;
    info!(user_id = %user_id, "Deleted");

    Ok(DemoOutcome {
        user_id: user_id.to_string(),
        token: token.into(),
        public_key_xml,
    })
}
