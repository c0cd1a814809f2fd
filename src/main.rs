use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use estate_store::logging::init_tracing;
use estate_store::{
    Config, DocumentType, EstateDb, Location, Property, PropertyPatch, PropertyType, User,
    UserRole, VerificationDecision, VerificationDocument,
};

/// Real estate document store tools.
#[derive(Parser)]
#[command(name = "estate-store")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug logging (RUST_LOG still wins when set)
    #[arg(global = true, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create collections and indexes, then list them
    Init,

    /// Load the bundled sample data (skips what already exists)
    Seed,

    /// Show platform counters
    Stats,

    /// List documents waiting for review
    Pending {
        /// Maximum number of documents to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Approve or reject a verification document
    Verify {
        /// Document to review
        document_id: String,

        /// Reviewing admin's uid
        #[arg(long)]
        admin: String,

        /// Approve the document
        #[arg(long, conflicts_with = "reject")]
        approve: bool,

        /// Reject the document with this reason
        #[arg(long, value_name = "REASON")]
        reject: Option<String>,
    },

    /// Walk through a price change and an identity verification on a scratch database
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    match cli.command {
        Commands::Init => run_init(),
        Commands::Seed => run_seed(),
        Commands::Stats => run_stats(),
        Commands::Pending { limit } => run_pending(limit),
        Commands::Verify {
            document_id,
            admin,
            approve,
            reject,
        } => {
            let decision = match (approve, reject) {
                (true, _) => VerificationDecision::Verified,
                (false, Some(reason)) => VerificationDecision::rejected(reason),
                (false, None) => anyhow::bail!("pass --approve or --reject <REASON>"),
            };
            run_verify(&document_id, &admin, decision)
        }
        Commands::Demo => run_demo(),
    }
}

fn open_store() -> Result<EstateDb> {
    let config = Config::from_env()?;
    EstateDb::open(&config).context("Failed to open the database")
}

fn run_init() -> Result<()> {
    println!("🗄️  Initializing database");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db = open_store()?;
    let indexes = db.create_indexes().context("Failed to create indexes")?;
    println!("✓ Collections ready, {} secondary indexes", indexes);

    println!("\n📚 Collections:");
    for (name, count) in db.list_collections()? {
        println!("   {:<24} {:>6}", name, count);
    }
    Ok(())
}

fn run_seed() -> Result<()> {
    println!("🌱 Loading sample data");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db = open_store()?;
    let report = db.seed_sample_data().context("Failed to seed sample data")?;
    println!("✓ Inserted {} documents", report.inserted);
    println!("✓ Skipped {} existing documents", report.skipped);
    Ok(())
}

fn run_stats() -> Result<()> {
    let db = open_store()?;
    let stats = db.get_analytics()?;

    println!("📊 Database summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Total Users:           {}", stats.total_users);
    println!("   Total Properties:      {}", stats.total_properties);
    println!("   Total Listings:        {}", stats.total_listings);
    println!("   Active Listings:       {}", stats.active_listings);
    println!("   Pending Verifications: {}", stats.pending_verifications);
    Ok(())
}

fn run_pending(limit: usize) -> Result<()> {
    let db = open_store()?;
    let pending = db.get_pending_verifications(limit)?;

    if pending.is_empty() {
        println!("✓ Nothing waiting for review");
        return Ok(());
    }
    println!("📝 {} document(s) pending:", pending.len());
    for doc in pending {
        println!(
            "   {:<28} {:<20} {:<20} {}",
            doc.document_id, doc.document_type, doc.user_firebase_uid, doc.document_url
        );
    }
    Ok(())
}

fn run_verify(document_id: &str, admin: &str, decision: VerificationDecision) -> Result<()> {
    let db = open_store()?;
    let outcome = db
        .verify_document(document_id, admin, decision)
        .with_context(|| format!("Failed to review {}", document_id))?;

    println!("✓ {} is now {}", document_id, outcome.document.status);
    if outcome.user_verified {
        println!("✓ Owner {} verified", outcome.document.user_firebase_uid);
    }
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("🏠 Demo on an in-memory database");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db = EstateDb::in_memory()?;
    db.create_indexes()?;

    // 1. Create a property
    let property = db.create_property(
        Property::new(
            "Beautiful 3BR House in Austin",
            "Spacious family home with a large backyard",
            PropertyType::Residential,
            450_000.0,
            Location::new("123 Main Street", "Austin", "TX", "78701", "USA").at(30.2672, -97.7431),
        )
        .with_id("prop_001")
        .with_rooms(3, 2.5),
    )?;
    println!("\n1. Created {} at ${:.2}", property.property_id, property.current_price);

    // 2. Cut the price
    db.update_property("prop_001", PropertyPatch::price(425_000.0, "Price reduced"))?;
    let property = db
        .get_property_by_id("prop_001")?
        .context("prop_001 disappeared")?;
    println!("2. Price history:");
    for change in &property.price_history {
        println!(
            "   ${:>12.2}  {}  {}",
            change.price,
            change.changed_at.format("%Y-%m-%d %H:%M:%S"),
            change.reason.as_deref().unwrap_or("-")
        );
    }

    // 3. Review an identity proof
    db.create_user(User::new("user_9", "user9@example.com", "Jordan Lee", UserRole::Buyer))?;
    db.create_verification_document(
        VerificationDocument::new(
            "user_9",
            DocumentType::IdentityProof,
            "https://storage.example.com/docs/user_9_id.pdf",
        )
        .with_id("doc_77"),
    )?;
    let outcome = db.verify_document("doc_77", "admin_1", VerificationDecision::Verified)?;
    let user = db
        .get_user_by_firebase_uid("user_9")?
        .context("user_9 disappeared")?;
    println!(
        "3. doc_77 {} by admin_1, user_9 is {} (cascaded: {})",
        outcome.document.status, user.verification_status, outcome.user_verified
    );

    // 4. A second review is refused
    match db.verify_document("doc_77", "admin_2", VerificationDecision::rejected("Second look")) {
        Ok(_) => println!("4. Unexpected: second review succeeded"),
        Err(err) => println!("4. Second review refused: {}", err),
    }

    println!("\n✅ Demo complete");
    Ok(())
}
