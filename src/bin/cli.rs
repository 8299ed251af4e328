use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use storefront_state::catalog::search::INSTANT_RESULTS_LIMIT;
use storefront_state::catalog::{Catalog, QueryState, SortMode};
use storefront_state::session::Member;
use storefront_state::{sdk, Product, ProductId, Session, StorefrontConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory for persisted cart and favorites (env: STOREFRONT_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Catalog JSON file (env: STOREFRONT_CATALOG)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Products per page (env: STOREFRONT_PAGE_SIZE)
    #[arg(long)]
    page_size: Option<NonZeroUsize>,

    /// Display name of a signed-in member
    #[arg(long)]
    member: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Browse one page of the catalog
    Shop {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "All")]
        subcategory: String,
        #[arg(long, default_value = "All")]
        color: String,
        /// featured, newest, price-low or price-high
        #[arg(long, default_value = "featured")]
        sort: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Search {
        query: String,
        #[arg(long, default_value_t = INSTANT_RESULTS_LIMIT)]
        limit: usize,
    },
    #[command(subcommand)]
    Cart(CartCommand),
    #[command(subcommand)]
    Fav(FavCommand),
}

#[derive(Subcommand, Clone)]
enum CartCommand {
    Add { id: i32, #[arg(long)] size: Option<String> },
    Remove { id: i32, #[arg(long)] size: Option<String> },
    Delete { id: i32, #[arg(long)] size: Option<String> },
    Clear,
    Show,
}

#[derive(Subcommand, Clone)]
enum FavCommand {
    Toggle { id: i32 },
    List,
    Clear,
}

fn load_catalog(config: &StorefrontConfig) -> anyhow::Result<Catalog> {
    let Some(path) = &config.catalog_path else {
        bail!("no catalog configured; pass --catalog or set STOREFRONT_CATALOG");
    };
    Catalog::load(path).with_context(|| format!("loading catalog {:?}", path))
}

fn find_product(catalog: &Catalog, id: i32) -> anyhow::Result<&Product> {
    catalog
        .get(ProductId::new(id))
        .with_context(|| format!("no product with id {}", id))
}

fn print_product(product: &Product) {
    println!(
        "{:>4}  {:<32} {:>10}  {} / {} / {}",
        product.id,
        product.name,
        product.price.to_string(),
        product.category,
        product.subcategory.as_deref().unwrap_or("-"),
        product.color.as_deref().unwrap_or("-"),
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = StorefrontConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(path) = cli.catalog {
        config.catalog_path = Some(path);
    }
    if let Some(size) = cli.page_size {
        config.page_size = size;
    }

    let mut storefront = sdk::open(&config);
    if let Some(name) = cli.member {
        storefront.set_session(Session::signed_in(Member { name, email: None }));
    }

    match cli.command {
        Commands::Shop { category, subcategory, color, sort, page } => {
            let catalog = load_catalog(&config)?;
            let mut state = QueryState::new(config.page_size);
            state.navigate(category.as_deref());
            state.select_subcategory(subcategory);
            state.select_color(color);
            state.select_sort(sort.parse::<SortMode>()?);
            state.go_to_page(page);

            let result = catalog.query(state.config());
            println!("Categories: {}", result.facets.categories.join(", "));
            println!("Types:      {}", result.facets.subcategories.join(", "));
            println!("Colors:     {}", result.facets.colors.join(", "));
            println!();
            if result.is_empty() {
                println!("No results found");
                return Ok(());
            }
            for product in &result.items {
                print_product(product);
            }
            println!(
                "showing {} of {} results (page {} of {})",
                result.items.len(),
                result.total_matches,
                result.page,
                result.total_pages
            );
        }
        Commands::Search { query, limit } => {
            let catalog = load_catalog(&config)?;
            for product in catalog.search(&query, limit) {
                print_product(product);
            }
        }
        Commands::Cart(command) => {
            match command {
                CartCommand::Add { id, size } => {
                    let catalog = load_catalog(&config)?;
                    let product = find_product(&catalog, id)?;
                    storefront.cart.add_item(product, size.as_deref());
                }
                CartCommand::Remove { id, size } => {
                    storefront.cart.remove_item(ProductId::new(id), size.as_deref());
                }
                CartCommand::Delete { id, size } => {
                    storefront.cart.delete_item(ProductId::new(id), size.as_deref());
                }
                CartCommand::Clear => storefront.cart.clear_cart(),
                CartCommand::Show => {}
            }

            for item in storefront.cart.items() {
                println!(
                    "{:>4}  {:<32} {:<8} x{:<3} {:>10}",
                    item.product.id,
                    item.product.name,
                    item.selected_size.as_deref().unwrap_or("-"),
                    item.quantity,
                    item.line_price().to_string(),
                );
            }
            let summary = storefront.cart_summary();
            println!("Items: {}  Subtotal: {}", summary.total_items, summary.subtotal);
            if summary.checkout_enabled {
                let label = if summary.member_checkout { "Member Checkout" } else { "Guest Checkout" };
                println!("{} available", label);
            }
        }
        Commands::Fav(command) => {
            match command {
                FavCommand::Toggle { id } => {
                    let catalog = load_catalog(&config)?;
                    let product = find_product(&catalog, id)?;
                    let now = storefront.favorites.toggle_favorite(product);
                    println!("{} {}", product.name, if now { "added to favorites" } else { "removed from favorites" });
                }
                FavCommand::List => {
                    for product in storefront.favorites.items() {
                        print_product(product);
                    }
                }
                FavCommand::Clear => storefront.favorites.clear_favorites(),
            }
            println!("Favorites: {}", storefront.favorites.len());
        }
    }

    if !storefront.is_durable() {
        eprintln!("warning: changes were not saved to {:?}", config.data_dir);
    }

    Ok(())
}
