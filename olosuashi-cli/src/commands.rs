use anyhow::{bail, Context};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use clap::{Args, Parser, Subcommand, ValueEnum};
use olosuashi_admin::{
    CoverChoice, PendingImage, RetryPolicy, SaveError, TourForm, TourSaveSaga, TourTable,
};
use olosuashi_booking::{
    BookingContext, BookingError, BookingModal, DraftAction, SubmitOutcome, WhatsappLink,
};
use olosuashi_catalog::{
    AutoRotation, AvailabilityCalendar, Carousel, CatalogPage, HomePage, PriceTag, TourView,
    Wishlist, WishlistError,
};
use olosuashi_core::{routes, ExperienceGateway, ListQuery, Navigator, TourGateway};
use olosuashi_shared::{
    Masked, PaymentMethod, ServiceKind, TourPayload, TourSummary, UserProfile, UserRole,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::sitemap;
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "olosuashi", version, about = "Olosuashi tours & safaris")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write sitemap.xml from the published tour and experience slugs
    Sitemap {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Landing page: hero slides and featured tours
    Home {
        /// Watch the hero carousel rotate this many times
        #[arg(long, default_value_t = 0)]
        rotations: u32,
    },
    /// List tours, e.g. `tours "page=2&search=mara&category=wildlife"`
    Tours {
        #[arg(default_value = "")]
        query: String,
    },
    Experiences {
        #[arg(default_value = "")]
        query: String,
    },
    /// Tour detail, optionally checking a departure date
    Tour {
        slug: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        travelers: u32,
    },
    Experience {
        slug: String,
    },
    Book(BookArgs),
    /// Add or remove a tour from the wishlist
    Wishlist {
        slug: String,
    },
    SignIn(SignInArgs),
    SignOut,
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Method {
    Online,
    Whatsapp,
    Call,
}

impl From<Method> for PaymentMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Online => PaymentMethod::Online,
            Method::Whatsapp => PaymentMethod::Whatsapp,
            Method::Call => PaymentMethod::Call,
        }
    }
}

#[derive(Debug, Args)]
pub struct BookArgs {
    pub slug: String,
    /// Book an experience instead of a tour
    #[arg(long)]
    pub experience: bool,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long, default_value_t = 1)]
    pub travelers: u32,
    #[arg(long, value_enum, default_value_t = Method::Whatsapp)]
    pub method: Method,
    /// Your WhatsApp number, international format
    #[arg(long)]
    pub whatsapp: Option<String>,
    #[arg(long)]
    pub requests: Option<String>,
}

#[derive(Debug, Args)]
pub struct SignInArgs {
    #[arg(long)]
    pub token: String,
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub admin: bool,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Delete {
        id: Uuid,
    },
    /// Create a tour from a JSON payload, or update one with `--edit <slug>`
    Save {
        payload: PathBuf,
        #[arg(long)]
        edit: Option<String>,
        #[arg(long = "image")]
        images: Vec<PathBuf>,
        /// Index into the `--image` list to use as cover
        #[arg(long)]
        cover: Option<usize>,
    },
}

/// The calendar date on the wall clock of `now`'s zone, not UTC.
fn calendar_today<Tz: TimeZone>(now: DateTime<Tz>) -> NaiveDate {
    now.date_naive()
}

pub async fn run(command: Command, state: &AppState) -> anyhow::Result<()> {
    match command {
        Command::Sitemap { output } => {
            let output = output.unwrap_or_else(|| state.config.sitemap.output_path.clone());
            let count = sitemap::generate(
                state.client.as_ref(),
                &state.config.site.base_url,
                &output,
                calendar_today(Local::now()),
            )
            .await?;
            println!("Wrote {} URLs to {}", count, output.display());
        }
        Command::Home { rotations } => home(state, rotations).await?,
        Command::Tours { query } => {
            let page = CatalogPage::tours(state.client.as_ref(), &query).await?;
            for tour in &page.results.items {
                print_summary(tour);
            }
            print_paging(page.is_empty(), page.results.page, page.results.total_pages);
            print_links(page.previous_link(), page.next_link());
        }
        Command::Experiences { query } => {
            let page = CatalogPage::experiences(state.client.as_ref(), &query).await?;
            for experience in &page.results.items {
                println!(
                    "{:<40} {:>6} USD  {}h  /experiences/{}",
                    experience.title, experience.price, experience.duration_hours, experience.slug
                );
            }
            print_paging(page.is_empty(), page.results.page, page.results.total_pages);
            print_links(page.previous_link(), page.next_link());
        }
        Command::Tour { slug, date, travelers } => tour_detail(state, &slug, date, travelers).await?,
        Command::Experience { slug } => {
            let experience = state.client.experience_by_slug(&slug).await?;
            println!("{}", experience.title);
            println!("{} USD per person, {} hours", experience.price, experience.duration_hours);
            if let Some(location) = &experience.location {
                println!("Location: {}", location);
            }
            println!("\n{}", experience.description);
        }
        Command::Book(args) => book(state, args).await?,
        Command::Wishlist { slug } => {
            let tour = state.client.tour_by_slug(&slug).await?;
            let mut wishlist = Wishlist::new(state.client.clone(), state.session.clone());
            wishlist.refresh(tour.id).await?;
            match wishlist.toggle(tour.id).await {
                Ok(true) => println!("Saved {} to your wishlist", tour.title),
                Ok(false) => println!("Removed {} from your wishlist", tour.title),
                Err(WishlistError::SignInRequired) => {
                    eprintln!("{}", WishlistError::SignInRequired);
                    state.navigator.navigate(routes::SIGN_IN);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::SignIn(args) => {
            let user = UserProfile {
                id: args.id,
                name: args.name,
                email: args.email,
                role: if args.admin { UserRole::Admin } else { UserRole::Customer },
            };
            state.session.sign_in(&args.token, &user)?;
            println!("Signed in as {} ({})", user.name, Masked(&user.email));
        }
        Command::SignOut => {
            state.session.sign_out()?;
            println!("Signed out");
        }
        Command::Admin(command) => {
            if !state.session.is_admin() {
                state.navigator.navigate(routes::SIGN_IN);
                bail!("Admin access required, sign in with an admin account");
            }
            admin(state, command).await?;
        }
    }
    Ok(())
}

async fn home(state: &AppState, rotations: u32) -> anyhow::Result<()> {
    let page = HomePage::load(state.client.as_ref(), state.client.as_ref()).await?;

    for slide in &page.hero {
        println!("* {}", slide.title);
    }
    println!("\nFeatured tours");
    for tour in &page.featured {
        print_summary(tour);
    }

    if rotations == 0 || page.hero.len() < 2 {
        return Ok(());
    }

    // Dropping the handle at the end of this scope stops the timer
    let rotation = AutoRotation::start(
        Carousel::new(page.hero.len()),
        state.config.carousel.rotation_interval(),
    );
    let mut current = rotation.subscribe();
    for _ in 0..rotations {
        if current.changed().await.is_err() {
            break;
        }
        let index = *current.borrow();
        if let Some(slide) = page.hero.get(index) {
            println!("[{}/{}] {}", index + 1, page.hero.len(), slide.title);
        }
    }
    Ok(())
}

async fn tour_detail(
    state: &AppState,
    slug: &str,
    date: Option<NaiveDate>,
    travelers: u32,
) -> anyhow::Result<()> {
    let tour = olosuashi_catalog::listing::tour_detail(state.client.as_ref(), slug).await?;

    println!("{}", tour.title);
    println!("{} | {:?}", tour.duration_label(), tour.difficulty);
    println!("{}", format_price(&tour.price_tag()));
    if let Some(rating) = tour.average_rating() {
        println!("Rated {:.1}/5 from {} review(s)", rating, tour.reviews.len());
    }
    println!("{} photo(s)", tour.gallery().len());
    println!("\n{}", tour.description);

    if !tour.itinerary.is_empty() {
        println!("\nItinerary");
        for day in &tour.itinerary {
            println!("  Day {}: {}", day.day, day.title);
        }
    }
    for (kind, label) in [(ServiceKind::Included, "Included"), (ServiceKind::Excluded, "Not included")] {
        let services = tour.services_of(kind);
        if !services.is_empty() {
            let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
            println!("{}: {}", label, names.join(", "));
        }
    }

    if let Some(date) = date {
        let calendar = AvailabilityCalendar::for_tour(&tour);
        match calendar.check(date, travelers) {
            Ok(window) => println!("\n{} is available, {} place(s) left", date, window.slots),
            Err(e) => {
                println!("\n{}", e);
                if let Some(next) = calendar.next_available(date, travelers) {
                    println!("Next departure for {} traveler(s): {}", travelers, next);
                }
            }
        }
    }
    Ok(())
}

async fn book(state: &AppState, args: BookArgs) -> anyhow::Result<()> {
    let context = if args.experience {
        let experience = state.client.experience_by_slug(&args.slug).await?;
        BookingContext {
            target_id: experience.id,
            title: experience.title,
            unit_price: experience.price,
            duration: format!("{} hours", experience.duration_hours),
            max_travelers: None,
        }
    } else {
        let tour = state.client.tour_by_slug(&args.slug).await?;
        BookingContext {
            target_id: tour.id,
            title: tour.title.clone(),
            unit_price: tour.price_tag().amount,
            duration: tour.duration_label(),
            max_travelers: tour.max_group_size,
        }
    };

    let mut modal = BookingModal::open(
        context,
        state.client.clone(),
        state.navigator.clone(),
        state.notifier.clone(),
        WhatsappLink::new(&state.config.site.whatsapp_number),
    );
    modal.dispatch(DraftAction::SetTravelDate(args.date));
    modal.dispatch(DraftAction::SetTravelers(args.travelers));
    modal.dispatch(DraftAction::SetPaymentMethod(args.method.into()));
    if let Some(number) = args.whatsapp {
        modal.dispatch(DraftAction::SetWhatsappNumber(number));
    }
    if let Some(requests) = args.requests {
        modal.dispatch(DraftAction::SetSpecialRequests(requests));
    }

    info!("Submitting booking {} for {}", modal.idempotency_key(), modal.context().title);
    println!("Total: {} for {} traveler(s)", modal.total_price(), modal.draft().number_of_travelers);

    match modal.submit(calendar_today(Local::now())).await {
        Ok(SubmitOutcome::Redirected { booking }) | Ok(SubmitOutcome::OpenedWhatsapp { booking, .. }) => {
            println!("Booking {} received ({:?})", booking.id, booking.status);
        }
        Ok(SubmitOutcome::OnlinePaymentUnavailable) => {
            println!("Payment method switched to WhatsApp; run the command again to book.");
        }
        Err(BookingError::Invalid(errors)) => bail!("Booking not sent: {}", errors),
        Err(e) => return Err(e.into()),
    }
    modal.close();
    Ok(())
}

async fn admin(state: &AppState, command: AdminCommand) -> anyhow::Result<()> {
    match command {
        AdminCommand::List { search, category, page } => {
            let query = ListQuery::default()
                .with_search(search.as_deref())
                .with_category(category.as_deref())
                .with_page(page);
            let mut table = TourTable::with_query(state.client.clone(), query);
            table.load().await?;
            for tour in table.rows() {
                println!("{}  {}", tour.id, tour.title);
            }
            if let Some(page) = table.page() {
                print_paging(page.items.is_empty(), page.page, page.total_pages);
            }
        }
        AdminCommand::Delete { id } => {
            let mut table = TourTable::new(state.client.clone());
            table.delete(id).await?;
            println!("Deleted tour {}", id);
        }
        AdminCommand::Save { payload, edit, images, cover } => {
            let payload = read_payload(&payload)?;
            let mut form = match edit {
                Some(slug) => TourForm::from_tour(&state.client.tour_by_slug(&slug).await?),
                None => TourForm::new(),
            };
            apply_payload(&mut form, payload);
            for path in &images {
                form.add_image(read_image(path)?);
            }
            if let Some(index) = cover {
                form.cover = Some(CoverChoice::Pending(index));
            }

            let saga = TourSaveSaga::new(
                state.client.clone(),
                state.client.clone(),
                RetryPolicy {
                    max_attempts: state.config.admin.retry_attempts,
                    backoff: state.config.admin.backoff(),
                },
            );
            match saga.save(&form).await {
                Ok(report) => {
                    println!(
                        "Saved {} (/tours/{}) with {} new image(s)",
                        report.tour.title,
                        report.tour.slug,
                        report.uploaded.len()
                    );
                }
                Err(SaveError::StepFailed { step, source, compensation, .. }) => {
                    if let Some(id) = compensation.deleted_tour {
                        eprintln!("Rolled back new tour {}", id);
                    }
                    if !compensation.deleted_images.is_empty() {
                        eprintln!("Removed {} uploaded image(s)", compensation.deleted_images.len());
                    }
                    for failure in &compensation.failures {
                        eprintln!("Cleanup failed: {}", failure);
                    }
                    bail!("Could not {}: {}", step, source);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

/// Overwrite the editable fields of `form`, keeping its id and images.
fn apply_payload(form: &mut TourForm, payload: TourPayload) {
    form.title = payload.title;
    form.slug = payload.slug;
    form.description = payload.description;
    form.category = payload.category.unwrap_or_default();
    form.base_price = payload.pricing.base_price;
    form.discount_price = payload.pricing.discount_price;
    form.currency = payload.pricing.currency;
    form.duration_days = payload.duration_days;
    form.difficulty = payload.difficulty;
    form.min_group_size = payload.min_group_size;
    form.max_group_size = payload.max_group_size;
    form.is_featured = payload.is_featured;
    form.itinerary = payload.itinerary.into();
    form.vehicles = payload.vehicles.into();
    form.locations = payload.locations.into();
    form.services = payload.services.into();
    form.availability = payload.availability.into();
}

fn read_payload(path: &Path) -> anyhow::Result<TourPayload> {
    let raw = fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Parsing {}", path.display()))
}

fn read_image(path: &Path) -> anyhow::Result<PendingImage> {
    let bytes = fs::read(path).with_context(|| format!("Reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(PendingImage::new(file_name, bytes)?)
}

fn format_price(tag: &PriceTag) -> String {
    match (tag.was, tag.discount_percent) {
        (Some(was), Some(percent)) => {
            format!("{} {} (was {}, save {}%)", tag.currency, tag.amount, was, percent)
        }
        _ => format!("{} {}", tag.currency, tag.amount),
    }
}

fn print_summary(tour: &TourSummary) {
    let price = format_price(&PriceTag::from_pricing(&tour.pricing));
    println!("{:<40} {:>18}  {}d  /tours/{}", tour.title, price, tour.duration_days, tour.slug);
}

fn print_paging(empty: bool, page: u32, total_pages: u32) {
    if empty {
        println!("No results");
    } else {
        println!("Page {} of {}", page, total_pages.max(1));
    }
}

fn print_links(previous: Option<String>, next: Option<String>) {
    if let Some(previous) = previous {
        println!("previous: ?{}", previous);
    }
    if let Some(next) = next {
        println!("next: ?{}", next);
    }
}
