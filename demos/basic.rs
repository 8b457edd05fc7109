use easemob_im::message::{Message, MessageBody, Target};
use easemob_im::user::NewUser;
use easemob_im::{Config, ImClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional: enable basic logging for the example
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // Load configuration from a JSON file placed next to the binary
    let cfg = Config::from_file("config.json")?;
    let client = ImClient::new(cfg)?;

    client
        .user()
        .register_users(&[NewUser::new("alice", "alice-pw"), NewUser::new("bob", "bob-pw")])
        .await?;
    client.user().add_friend("alice", "bob").await?;

    let message = Message::new(Target::User)
        .sender("alice")
        .add_receivers(["bob"])
        .body(MessageBody::text("hello from rust"));
    let ids = client.message().send(&message).await?;
    for (receiver, id) in ids {
        println!("{receiver}: {id}");
    }
    Ok(())
}
