use crate::infra::{parse_kind_filter, parse_timestamp, parse_urgency_filter, AdminServices};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use teranga_admin::error::AppError;
use teranga_admin::workflows::accommodations::{AccommodationDraft, AccommodationKind};
use teranga_admin::workflows::actor::{Actor, ActorRole};
use teranga_admin::workflows::articles::ArticleDraft;
use teranga_admin::workflows::catalog::PURGE_CONFIRMATION;
use teranga_admin::workflows::listings::{
    ContentId, ContentKind, KindFilter, ListingDetails, QueueEntry, QueueFilter, UrgencyFilter,
};
use teranga_admin::workflows::users::UserDraft;

#[derive(Args, Debug, Default)]
pub(crate) struct QueueArgs {
    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Restrict to one kind: all, event or tour
    #[arg(long, value_parser = parse_kind_filter, default_value = "all")]
    pub(crate) kind: KindFilter,
    /// Restrict to one urgency tier: all, high, medium or low
    #[arg(long, value_parser = parse_urgency_filter, default_value = "all")]
    pub(crate) urgency: UrgencyFilter,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) now: Option<DateTime<Utc>>,
}

/// Actors and listings created by the demo seed.
pub(crate) struct DemoSeed {
    pub(crate) admin: Actor,
    pub(crate) guide: Actor,
    pub(crate) organizer: Actor,
    pub(crate) lac_rose: ContentId,
    pub(crate) jazz_festival: ContentId,
    pub(crate) bassari_trek: ContentId,
    pub(crate) fashion_week: ContentId,
    pub(crate) goree_draft: ContentId,
}

pub(crate) fn run_queue(args: QueueArgs) -> Result<(), AppError> {
    let now = args.now.unwrap_or_else(Utc::now);
    let services = AdminServices::in_memory();
    seed_catalog(&services, now)?;

    let filter = QueueFilter {
        kind: args.kind,
        urgency: args.urgency,
    };
    let queue = services.listings.validation_queue(now, filter)?;
    println!("Validation queue at {}", now.to_rfc3339());
    render_queue(&queue);

    let stats = services.listings.queue_stats(now)?;
    println!(
        "\n{} pending ({} events / {} tours) | high {} | medium {} | low {} | {} expiring within 24h | {} expired",
        stats.total_pending,
        stats.events_pending,
        stats.tours_pending,
        stats.high,
        stats.medium,
        stats.low,
        stats.expiring_soon,
        stats.expired
    );
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = args.now.unwrap_or_else(Utc::now);
    let services = AdminServices::in_memory();
    let seed = seed_catalog(&services, now)?;
    let listings = &services.listings;

    println!("Teranga back-office demo at {}", now.to_rfc3339());
    println!("\nPending review");
    render_queue(&listings.validation_queue(now, QueueFilter::default())?);

    println!("\nModeration");
    let approved = listings.approve(&seed.admin, &seed.jazz_festival, now)?;
    println!(
        "- {} -> {} (validated by {})",
        approved.id,
        approved.status,
        approved.validated_by.as_deref().unwrap_or("-")
    );
    match listings.reject(&seed.admin, &seed.bassari_trek, "   ", now) {
        Ok(record) => println!("- {} unexpectedly rejected without reason", record.id),
        Err(err) => println!("- blank rejection refused: {err}"),
    }
    let rejected = listings.reject(
        &seed.admin,
        &seed.bassari_trek,
        "Merci de préciser le point de rendez-vous et la durée.",
        now,
    )?;
    println!(
        "- {} -> {} ({})",
        rejected.id,
        rejected.status,
        rejected.rejection_reason.as_deref().unwrap_or("-")
    );
    let resubmitted = listings.submit(&seed.guide, &seed.bassari_trek, now)?;
    println!(
        "- {} resubmitted, auto-publish at {}",
        resubmitted.id,
        resubmitted
            .auto_publish_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_default()
    );

    println!("\nAuto-publish sweep");
    let report = listings.sweep_auto_publish(now)?;
    println!(
        "- examined {} | published {} | not yet due {} | superseded {}",
        report.examined,
        report.published.len(),
        report.not_due,
        report.superseded
    );
    for id in &report.published {
        println!("  - {id} published after its review window elapsed");
    }
    let cancelled = listings.cancel_listing(&seed.organizer, &seed.fashion_week, now)?;
    println!("- {} cancelled by its organizer -> {}", cancelled.id, cancelled.status);
    let later = now + Duration::hours(3);
    let lac_rose = listings.auto_publish(&seed.lac_rose, later)?;
    println!("- {} at {}: {:?}", seed.lac_rose, later.to_rfc3339(), lac_rose);

    println!("\nTrash");
    let trashed = listings.delete(&seed.guide, &seed.goree_draft, now)?;
    println!(
        "- '{}' moved to trash by {}",
        trashed.record.details.title, trashed.deleted_by
    );
    let challenge = listings.request_purge(&seed.admin, &seed.goree_draft)?;
    println!(
        "- purge of '{}' requires typing {}",
        challenge.label, challenge.confirmation_phrase
    );
    match listings.purge(&seed.admin, &seed.goree_draft, "supprimer") {
        Ok(_) => println!("- purge accepted a lowercase confirmation"),
        Err(err) => println!("- purge aborted: {err}"),
    }
    listings.purge(&seed.admin, &seed.goree_draft, PURGE_CONFIRMATION)?;
    println!(
        "- purged; {} record(s) left in trash",
        listings.list_trash()?.len()
    );

    let notices = services.outbox.notices();
    if notices.is_empty() {
        println!("\nOwner notices: none dispatched");
    } else {
        println!("\nOwner notices");
        for notice in notices {
            println!(
                "  - template={} -> {} ({})",
                notice.template, notice.owner_id, notice.content_id
            );
        }
    }

    let users = services.users.stats(now)?;
    let articles = services.articles.stats()?;
    println!(
        "\nCatalog: {} users ({} active) | {} articles ({} featured) | {} accommodations",
        users.total,
        users.active,
        articles.total,
        articles.featured,
        services.accommodations.list(&Default::default())?.len()
    );
    Ok(())
}

/// Populate every collection with a small Senegalese catalog. Pending
/// listings are staggered so the queue shows each urgency tier at `now`.
pub(crate) fn seed_catalog(services: &AdminServices, now: DateTime<Utc>) -> Result<DemoSeed, AppError> {
    let bootstrap = Actor::new("user-000001", "Aminata Sow", ActorRole::Admin);
    let admin = services.users.create(
        &bootstrap,
        user_draft("Aminata Sow", "aminata.sow@teranga.sn", ActorRole::Admin, "Dakar"),
        now - Duration::days(120),
    )?;
    let guide = services.users.create(
        &bootstrap,
        user_draft("Moussa Diop", "moussa.diop@teranga.sn", ActorRole::Guide, "Saint-Louis"),
        now - Duration::days(60),
    )?;
    let organizer = services.users.create(
        &bootstrap,
        user_draft("Fatou Ndiaye", "fatou.ndiaye@teranga.sn", ActorRole::Organizer, "Dakar"),
        now - Duration::days(12),
    )?;
    services.users.create(
        &bootstrap,
        user_draft("Jean Martin", "jean.martin@example.fr", ActorRole::Tourist, "Lyon"),
        now - Duration::days(3),
    )?;

    let admin = Actor::new(admin.id.0, admin.name, ActorRole::Admin);
    let guide = Actor::new(guide.id.0, guide.name, ActorRole::Guide);
    let organizer = Actor::new(organizer.id.0, organizer.name, ActorRole::Organizer);

    let listings = &services.listings;
    let lac_rose = listings.create(
        &guide,
        ContentKind::Tour,
        listing("Balade en pirogue au Lac Rose", "Excursion", "Lac Rose", 25_000),
        true,
        now - Duration::hours(46),
    )?;
    let jazz_festival = listings.create(
        &organizer,
        ContentKind::Event,
        listing("Festival de Jazz de Saint-Louis", "Musique", "Saint-Louis", 15_000),
        true,
        now - Duration::hours(30),
    )?;
    let bassari_trek = listings.create(
        &guide,
        ContentKind::Tour,
        listing("Randonnée au Pays Bassari", "Randonnée", "Kédougou", 60_000),
        true,
        now - Duration::hours(3),
    )?;
    let fashion_week = listings.create(
        &organizer,
        ContentKind::Event,
        listing("Dakar Fashion Week", "Mode", "Dakar", 10_000),
        true,
        now - Duration::hours(50),
    )?;
    let goree_draft = listings.create(
        &guide,
        ContentKind::Tour,
        listing("Mémoire de l'Île de Gorée", "Culture", "Gorée", 8_000),
        false,
        now - Duration::hours(1),
    )?;

    services.accommodations.create(
        &admin,
        AccommodationDraft {
            name: "Hôtel de la Poste".to_string(),
            kind: AccommodationKind::Hotel,
            location: "Saint-Louis".to_string(),
            address: "Quai Herbart".to_string(),
            description: "Hôtel historique face au pont Faidherbe.".to_string(),
            nightly_rate_fcfa: 45_000,
            rating: 4.3,
            amenities: vec!["wifi".to_string(), "restaurant".to_string()],
            phone: Some("+221 33 961 11 18".to_string()),
            email: None,
        },
        now - Duration::days(30),
    )?;
    services.accommodations.create(
        &admin,
        AccommodationDraft {
            name: "Campement Lac Rose".to_string(),
            kind: AccommodationKind::Campement,
            location: "Lac Rose".to_string(),
            address: String::new(),
            description: "Cases au bord du lac.".to_string(),
            nightly_rate_fcfa: 18_000,
            rating: 3.8,
            amenities: vec!["piscine".to_string()],
            phone: None,
            email: None,
        },
        now - Duration::days(8),
    )?;

    services.articles.create(
        &admin,
        article("Cinq plages à découvrir sur la Petite Côte", "Awa Fall", true),
        now - Duration::days(5),
    )?;
    services.articles.create(
        &admin,
        article("Le thiéboudienne, plat national", "Ibrahima Ba", false),
        now - Duration::days(2),
    )?;

    Ok(DemoSeed {
        admin,
        guide,
        organizer,
        lac_rose: lac_rose.id,
        jazz_festival: jazz_festival.id,
        bassari_trek: bassari_trek.id,
        fashion_week: fashion_week.id,
        goree_draft: goree_draft.id,
    })
}

fn render_queue(queue: &[QueueEntry]) {
    if queue.is_empty() {
        println!("  (empty)");
        return;
    }
    for entry in queue {
        println!(
            "  [{:<6}] {:<13} {:<40} {:<12} {} by {}",
            entry.urgency.label(),
            entry.id,
            entry.title,
            entry.location,
            entry.time_remaining,
            entry.owner_name
        );
    }
}

fn user_draft(name: &str, email: &str, role: ActorRole, location: &str) -> UserDraft {
    UserDraft {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        role,
        location: location.to_string(),
    }
}

fn listing(title: &str, category: &str, location: &str, price_fcfa: u32) -> ListingDetails {
    ListingDetails {
        title: title.to_string(),
        description: format!("{title} avec un guide local."),
        category: category.to_string(),
        location: location.to_string(),
        price_fcfa,
        capacity: Some(20),
        tags: vec![location.to_lowercase()],
    }
}

fn article(title: &str, author: &str, featured: bool) -> ArticleDraft {
    ArticleDraft {
        title: title.to_string(),
        author: author.to_string(),
        category: "Découverte".to_string(),
        excerpt: String::new(),
        body: format!("{title}."),
        tags: Vec::new(),
        read_time: Some("4 min".to_string()),
        featured,
        submit_for_review: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use teranga_admin::workflows::listings::{ContentStatus, Urgency};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 22, 9, 0, 0).unwrap()
    }

    #[test]
    fn seed_spreads_pending_listings_across_urgency_tiers() {
        let services = AdminServices::in_memory();
        let seed = seed_catalog(&services, now()).expect("seed loads");

        let queue = services
            .listings
            .validation_queue(now(), QueueFilter::default())
            .expect("queue builds");
        let order: Vec<&ContentId> = queue.iter().map(|entry| &entry.id).collect();
        assert_eq!(
            order,
            vec![
                &seed.fashion_week,
                &seed.lac_rose,
                &seed.jazz_festival,
                &seed.bassari_trek
            ]
        );
        assert_eq!(queue[0].time_remaining, "Expired");
        assert_eq!(queue[1].urgency, Urgency::High);
        assert_eq!(queue[2].urgency, Urgency::Medium);
        assert_eq!(queue[3].urgency, Urgency::Low);
    }

    #[test]
    fn seeded_sweep_publishes_only_the_expired_listing() {
        let services = AdminServices::in_memory();
        let seed = seed_catalog(&services, now()).expect("seed loads");

        let report = services
            .listings
            .sweep_auto_publish(now())
            .expect("sweep runs");
        assert_eq!(report.published, vec![seed.fashion_week.clone()]);
        assert_eq!(report.not_due, 3);
        let record = services.listings.get(&seed.fashion_week).expect("record");
        assert_eq!(record.status, ContentStatus::AutoPublished);
        assert_eq!(services.outbox.notices().len(), 1);
    }

    #[test]
    fn demo_walkthrough_completes() {
        run_demo(DemoArgs { now: Some(now()) }).expect("demo runs");
        run_queue(QueueArgs {
            now: Some(now()),
            kind: KindFilter::Tour,
            urgency: UrgencyFilter::All,
        })
        .expect("queue runs");
    }
}
