//! Default data
//!
//! Loads the launch catalog, export markets, knowledge-base posts, core UI
//! translations and the admin account into an empty store.

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;

use super::Store;
use crate::config::SeedConfig;
use crate::models::{
    BlogCategory, BlogPost, CreateBlogPostInput, CreateExportMarketInput, CreateProductInput,
    ExportMarket, Product, User, UserRole,
};
use crate::services::password::hash_password;

/// Counts of what a seeding run inserted
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub products: usize,
    pub export_markets: usize,
    pub blog_posts: usize,
    pub translations: usize,
}

/// Seed the store.
///
/// Does nothing when the configured admin account already exists, so calling
/// it twice is harmless.
pub async fn seed_defaults(store: &Store, config: &SeedConfig) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if store
        .users
        .get_by_username(&config.admin_username)
        .await?
        .is_some()
    {
        tracing::debug!("Admin user exists, skipping seed");
        return Ok(report);
    }

    let password_hash =
        hash_password(&config.admin_password).context("Failed to hash admin password")?;
    store
        .users
        .create(&User::new(
            config.admin_username.clone(),
            password_hash,
            UserRole::Admin,
            config.admin_email.clone(),
            config.admin_name.clone(),
        ))
        .await
        .context("Failed to create admin user")?;
    report.users = 1;

    for input in default_products() {
        store.products.create(&Product::from_input(input)).await?;
        report.products += 1;
    }

    for input in default_export_markets() {
        store.export_markets.create(&ExportMarket::from_input(input)).await?;
        report.export_markets += 1;
    }

    for (input, slug) in default_blog_posts() {
        store
            .blog_posts
            .create(&BlogPost::from_input(input, slug, None))
            .await?;
        report.blog_posts += 1;
    }

    for (key, language, value) in DEFAULT_TRANSLATIONS {
        store.translations.upsert(key, language, value).await?;
        report.translations += 1;
    }

    Ok(report)
}

fn specs(pairs: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn product(
    name: &str,
    category: &str,
    description: &str,
    image_url: &str,
    crops: &[&str],
    sizes: &[&str],
    specifications: &[(&str, &str)],
) -> CreateProductInput {
    CreateProductInput {
        name: name.to_string(),
        category: category.to_string(),
        description: Some(description.to_string()),
        specifications: specs(specifications),
        image_url: Some(image_url.to_string()),
        suitable_crops: strings(crops),
        packing_sizes: strings(sizes),
        is_active: Some(true),
    }
}

fn default_products() -> Vec<CreateProductInput> {
    vec![
        product(
            "Win-Choice",
            "plant-growth-promotor",
            "An amazing organic plant tonic designed to boost plant vitality and yield. It promotes healthy growth naturally and acts as an effective tonic for various crops.",
            "/Win-choke.jpeg",
            &["Chilli", "Cotton", "Vegetables"],
            &["100 ml", "250 ml"],
            &[("Benefits", "Boosts Plant Vitality"), ("Form", "Liquid"), ("Type", "Organic Tonic")],
        ),
        product(
            "Micro Mac Coconut Special",
            "micronutrients",
            "A specialized micronutrient formula approved by the Govt. of Tamil Nadu. It is fortified with essential minerals specifically designed to maximize coconut yield and quality.",
            "/Micro Max 2.jpeg",
            &["Coconut"],
            &["25 kg"],
            &[("Approval", "Govt. of Tamil Nadu Approved"), ("Form", "Granules"), ("Benefit", "Maximizes Yield and Quality")],
        ),
        product(
            "Excl Power",
            "micronutrients",
            "A premium plant protector that safeguards crops against environmental stress and pests. It rapidly corrects deficiencies and stimulates vigorous, healthy growth.",
            "/Excl Power.jpeg",
            &["Cotton", "Chilli"],
            &["250 ml", "500 ml", "1 L"],
            &[("Form", "Liquid"), ("Action", "Stress & Pest Protection"), ("Result", "Vigorous Growth")],
        ),
        product(
            "Cyto Max",
            "plant-growth-promotor",
            "A high-performance bio-stimulant that enhances metabolic processes, improves flowering, and increases overall crop productivity and quality.",
            "/Cito max.jpeg",
            &["Paddy", "Vegetables", "Banana", "Flowers"],
            &["8 kg"],
            &[("Type", "Bio-stimulant"), ("Form", "Granules"), ("Benefits", "Enhances Flowering & Productivity")],
        ),
        product(
            "Bactowin - 2000",
            "bactericide-fungicide",
            "Imparts strong resistance against diseases like Canker. It is easily dissolved in water and provides broad-spectrum protection for a wide variety of crops.",
            "/Bactowin.jpeg",
            &["Cotton", "Citrus", "Paddy", "Chillies", "Tomato", "Onion"],
            &["25 g"],
            &[("Target Disease", "Canker & others"), ("Solubility", "Water Soluble"), ("Protection", "Broad-spectrum")],
        ),
        product(
            "Micro Mac (Liquid)",
            "micronutrients",
            "A comprehensive liquid micronutrient mixture that corrects zinc, iron, and manganese deficiencies, ensuring balanced plant nutrition and lush foliage.",
            "/Micro mac.png",
            &["Paddy", "Flowers", "Chillies", "Vegetables"],
            &["500 ml", "1 L"],
            &[("Deficiencies Corrected", "Zinc, Iron, Manganese"), ("Form", "Liquid"), ("Benefit", "Balanced Nutrition")],
        ),
        product(
            "Humic Power",
            "liquid-fertilizer",
            "A natural plant booster enriched with 16% Humic Acid and 4% Fulvic Acid. It significantly improves soil structure, root development, and nutrient absorption.",
            "/Humic Pow.jpeg",
            &["Paddy", "Banana", "Chillies", "Cotton"],
            &["500 ml", "1 L"],
            &[("Composition", "16% Humic Acid, 4% Fulvic Acid"), ("Form", "Liquid"), ("Benefits", "Improves Soil Structure")],
        ),
        product(
            "K-Max",
            "pesticides",
            "Premium water-soluble Potassium Sulphate (00:00:50). It is essential for improving fruit quality, weight, sugar content, and overall shelf life.",
            "/K- Max.jpeg",
            &["Maize", "Tubers", "Flowering Plants"],
            &["250 ml", "500 ml"],
            &[("Composition", "Potassium Sulphate (00:00:50)"), ("Form", "Water Soluble Powder"), ("Benefits", "Improves Quality & Shelf Life")],
        ),
    ]
}

fn market(
    country: &str,
    code: &str,
    description: &str,
    product_count: i32,
    frequency: &str,
    flag: &str,
) -> CreateExportMarketInput {
    CreateExportMarketInput {
        country: country.to_string(),
        country_code: code.to_string(),
        description: Some(description.to_string()),
        product_count: Some(product_count),
        shipment_frequency: Some(frequency.to_string()),
        is_active: Some(true),
        flag_icon: Some(flag.to_string()),
    }
}

fn default_export_markets() -> Vec<CreateExportMarketInput> {
    vec![
        market("Ethiopia", "ET", "Key market for agricultural inputs in East Africa. Growing demand for quality micronutrients and bio-fertilizers.", 45, "Monthly", "🇪🇹"),
        market("Indonesia", "ID", "Major partner in Southeast Asia. Large-scale agricultural sector with high demand for advanced solutions.", 62, "Bi-weekly", "🇮🇩"),
        market("Kenya", "KE", "Strategic hub for East African distribution. Rapidly growing agricultural technology adoption.", 38, "Monthly", "🇰🇪"),
        market("Philippines", "PH", "Important market for rice and vegetable cultivation inputs. Strong demand for organic solutions.", 41, "Monthly", "🇵🇭"),
        market("Tanzania", "TZ", "Emerging market with significant agricultural potential. Growing awareness of micronutrient benefits.", 35, "Monthly", "🇹🇿"),
        market("Vietnam", "VN", "Advanced agricultural sector with high technology adoption. Premium product demand.", 55, "Bi-weekly", "🇻🇳"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn post(
    title: &str,
    slug: &str,
    content: &str,
    excerpt: &str,
    category: BlogCategory,
    image_url: &str,
    published: (i32, u32, u32),
    meta: (&str, &str),
) -> (CreateBlogPostInput, String) {
    let (y, m, d) = published;
    (
        CreateBlogPostInput {
            title: title.to_string(),
            slug: slug.to_string(),
            content: content.to_string(),
            excerpt: Some(excerpt.to_string()),
            category,
            image_url: Some(image_url.to_string()),
            is_published: Some(true),
            published_at: Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single(),
            meta_title: Some(meta.0.to_string()),
            meta_description: Some(meta.1.to_string()),
        },
        slug.to_string(),
    )
}

fn default_blog_posts() -> Vec<(CreateBlogPostInput, String)> {
    vec![
        post(
            "Micronutrient Management in Modern Agriculture",
            "micronutrient-management-modern-agriculture",
            "Comprehensive guide on managing micronutrients for optimal crop health...",
            "Learn about the critical role of micronutrients in plant health and discover best practices for micronutrient management in modern agricultural systems.",
            BlogCategory::Guide,
            "https://images.unsplash.com/photo-1625246333195-78d9c38ad449?w=1200",
            (2024, 1, 15),
            ("Complete Guide to Micronutrient Management", "Essential guide for farmers and agronomists on micronutrient management"),
        ),
        post(
            "Zinc Deficiency: Symptoms and Solutions",
            "zinc-deficiency-symptoms-solutions",
            "Understanding zinc deficiency in crops and effective correction strategies...",
            "Identify zinc deficiency symptoms early and implement proven solutions to restore crop health and maximize yields.",
            BlogCategory::Research,
            "https://images.unsplash.com/photo-1574943320219-553eb213f72d?w=1200",
            (2024, 1, 20),
            ("Zinc Deficiency in Crops: Complete Guide", "Research-based guide on zinc deficiency symptoms and correction"),
        ),
        post(
            "Success Story: 40% Yield Increase in Rice Cultivation",
            "rice-cultivation-yield-increase-case-study",
            "How proper micronutrient application led to dramatic yield improvements...",
            "A detailed case study showing how strategic micronutrient application helped farmers achieve 40% higher rice yields.",
            BlogCategory::CaseStudy,
            "https://images.unsplash.com/photo-1536304993881-ff6e9eefa2a6?w=1200",
            (2024, 2, 1),
            ("Rice Farming Success: 40% Yield Increase", "Real-world case study of micronutrient impact on rice yields"),
        ),
        post(
            "Bio-fertilizers: The Future of Sustainable Agriculture",
            "bio-fertilizers-sustainable-agriculture",
            "Exploring the role of bio-fertilizers in sustainable farming practices...",
            "Discover how bio-fertilizers are revolutionizing agriculture by reducing chemical inputs while maintaining high yields.",
            BlogCategory::Research,
            "https://images.unsplash.com/photo-1625246333195-78d9c38ad449?w=1200",
            (2024, 2, 10),
            ("Bio-fertilizers and Sustainable Farming", "Research on bio-fertilizers in modern sustainable agriculture"),
        ),
        post(
            "Complete Guide to Foliar Feeding",
            "complete-guide-foliar-feeding",
            "Best practices for foliar application of nutrients...",
            "Master the art of foliar feeding with this comprehensive guide covering timing, dosage, and application techniques.",
            BlogCategory::Guide,
            "https://images.unsplash.com/photo-1615811361523-6bd03d7748e7?w=1200",
            (2024, 2, 15),
            ("Foliar Feeding: Complete Application Guide", "Comprehensive guide to foliar nutrient application"),
        ),
        post(
            "Cotton Farming: Micronutrient Requirements",
            "cotton-farming-micronutrient-requirements",
            "Specific micronutrient needs of cotton crops throughout growth stages...",
            "Understand the unique micronutrient requirements of cotton and optimize your fertilization program for maximum fiber quality.",
            BlogCategory::Guide,
            "https://images.unsplash.com/photo-1591511991047-62d5a67fdecd?w=1200",
            (2024, 2, 20),
            ("Cotton Micronutrient Management Guide", "Essential micronutrients for cotton farming success"),
        ),
    ]
}

/// `(key, language, value)`
const DEFAULT_TRANSLATIONS: &[(&str, &str, &str)] = &[
    ("hero.title", "en", "Advanced Agricultural Solutions for Global Growth"),
    ("hero.title", "id", "Solusi Pertanian Canggih untuk Pertumbuhan Global"),
    ("hero.title", "am", "የላቀ የግብርና መፍትሄዎች ለአለም አቀፍ እድገት"),
    ("hero.description", "en", "Premium micronutrients, bactericides, and growth promoters trusted by distributors worldwide. Quality manufacturing from Pollachi, Tamil Nadu."),
    ("hero.description", "id", "Mikronutrien premium, bakterisida, dan promotor pertumbuhan yang dipercaya oleh distributor di seluruh dunia. Manufaktur berkualitas dari Pollachi, Tamil Nadu."),
    ("hero.description", "am", "በዓለም አቀፍ ተከፋፋዮች የሚታመኑ ከፍተኛ ጥራት ያላቸው ማይክሮ ንጥረ ነገሮች፣ ባክቴሪያ ገዳዮች እና የእድገት አበረታቾች። ከፖላቺ፣ ታሚል ናዱ ጥራት አምራች።"),
    ("nav.home", "en", "Home"),
    ("nav.home", "id", "Beranda"),
    ("nav.home", "am", "ቤት"),
    ("nav.products", "en", "Products"),
    ("nav.products", "id", "Produk"),
    ("nav.products", "am", "ምርቶች"),
    ("cta.getQuote", "en", "Get a Quote"),
    ("cta.getQuote", "id", "Dapatkan Penawaran"),
    ("cta.getQuote", "am", "ዋጋ ያግኙ"),
    ("cta.viewProducts", "en", "View Products"),
    ("cta.viewProducts", "id", "Lihat Produk"),
    ("cta.viewProducts", "am", "ምርቶችን ይመልከቱ"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_populates_store() {
        let store = Store::in_memory();
        let report = seed_defaults(&store, &SeedConfig::default()).await.unwrap();

        assert_eq!(report.users, 1);
        assert_eq!(report.products, 8);
        assert_eq!(report.export_markets, 6);
        assert_eq!(report.blog_posts, 6);
        assert_eq!(report.translations, 18);

        let admin = store.users.get_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert!(admin.password_hash.starts_with("$argon2id$"));
        assert_eq!(store.blog_posts.list_published().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = Store::in_memory();
        let config = SeedConfig::default();
        seed_defaults(&store, &config).await.unwrap();
        let second = seed_defaults(&store, &config).await.unwrap();

        assert_eq!(second, SeedReport::default());
        assert_eq!(store.products.list().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_every_key_has_all_languages() {
        let store = Store::in_memory();
        seed_defaults(&store, &SeedConfig::default()).await.unwrap();
        for language in crate::models::SUPPORTED_LANGUAGES {
            assert_eq!(store.translations.list_by_language(language).await.unwrap().len(), 6);
        }
    }
}
