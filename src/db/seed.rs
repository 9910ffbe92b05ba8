// Bootstrap seeding: default accounts and the demo catalog
//
// Every record is checked by its unique key before insertion, so running the
// seeder again only inserts what is still missing. Existing records are never
// updated. The check and the insert are separate calls: if another process
// inserts the same key in between, the store's UNIQUE error propagates.

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::{BcryptHasher, CredentialHasher};
use crate::db::store::{BookStore, SqliteStore, UserStore};
use crate::db::{BookCategory, NewBook, NewUser, Role};

/// Demo account created at startup. Credentials are logged in clear, so these
/// must never be real ones.
#[derive(Debug, Clone, Copy)]
pub struct SeedUser {
    pub kind: &'static str,
    pub username: &'static str,
    pub password: &'static str,
    pub role: Role,
}

pub const SEED_USERS: [SeedUser; 2] = [
    SeedUser {
        kind: "admin",
        username: "admin",
        password: "admin123",
        role: Role::Admin,
    },
    SeedUser {
        kind: "demo",
        username: "user",
        password: "user123",
        role: Role::User,
    },
];

#[derive(Debug, Clone, Copy)]
pub struct SeedBook {
    pub title: &'static str,
    pub author: &'static str,
    pub isbn: &'static str,
    pub price_cents: i64,
    pub description: &'static str,
    pub category: BookCategory,
    pub publication_year: i32,
}

impl SeedBook {
    pub fn to_new_book(&self) -> NewBook {
        NewBook {
            title: self.title.to_string(),
            author: self.author.to_string(),
            isbn: self.isbn.to_string(),
            price_cents: self.price_cents,
            description: self.description.to_string(),
            category: self.category,
            publication_year: self.publication_year,
            cover_url: None,
        }
    }
}

pub const SEED_BOOKS: [SeedBook; 8] = [
    SeedBook {
        title: "Les Misérables",
        author: "Victor Hugo",
        isbn: "978-1234567890",
        price_cents: 1990,
        description: "Un classique de la littérature française.",
        category: BookCategory::Novel,
        publication_year: 1862,
    },
    SeedBook {
        title: "Les Fleurs du mal",
        author: "Charles Baudelaire",
        isbn: "978-1234567891",
        price_cents: 1250,
        description: "Recueil majeur de poésie.",
        category: BookCategory::Poetry,
        publication_year: 1857,
    },
    SeedBook {
        title: "Cyrano de Bergerac",
        author: "Edmond Rostand",
        isbn: "978-1234567892",
        price_cents: 1400,
        description: "Pièce de théâtre en vers.",
        category: BookCategory::Theater,
        publication_year: 1897,
    },
    SeedBook {
        title: "Discours de la méthode",
        author: "René Descartes",
        isbn: "978-1234567893",
        price_cents: 990,
        description: "Texte fondateur de la philosophie moderne.",
        category: BookCategory::Essay,
        publication_year: 1637,
    },
    SeedBook {
        title: "Mémoires d’outre-tombe",
        author: "Chateaubriand",
        isbn: "978-1234567894",
        price_cents: 1800,
        description: "Autobiographie monumentale.",
        category: BookCategory::Biography,
        publication_year: 1848,
    },
    SeedBook {
        title: "Germinal",
        author: "Émile Zola",
        isbn: "978-1234567895",
        price_cents: 1190,
        description: "Roman naturaliste sur le monde ouvrier.",
        category: BookCategory::Novel,
        publication_year: 1885,
    },
    SeedBook {
        title: "Le Cid",
        author: "Pierre Corneille",
        isbn: "978-1234567896",
        price_cents: 1000,
        description: "Tragi-comédie classique.",
        category: BookCategory::Theater,
        publication_year: 1637,
    },
    SeedBook {
        title: "Essais",
        author: "Montaigne",
        isbn: "978-1234567897",
        price_cents: 1650,
        description: "Réflexions sur l’humanité et soi-même.",
        category: BookCategory::Essay,
        publication_year: 1580,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub users_created: usize,
    pub books_inserted: usize,
}

// Create every seed user whose username is not taken yet
pub async fn seed_users(users: &dyn UserStore, hasher: &dyn CredentialHasher) -> Result<usize> {
    let mut created = 0;

    for seed in SEED_USERS {
        if users.exists_by_username(seed.username).await? {
            info!(username = seed.username, "{} user already present, seed skipped", seed.kind);
            continue;
        }

        let password_hash = hasher.hash(seed.password)?;
        users
            .save_user(NewUser {
                username: seed.username.to_string(),
                password_hash,
                role: seed.role,
            })
            .await?;
        created += 1;

        info!(
            username = seed.username,
            role = %seed.role,
            "{} user created: {} / {}",
            seed.kind,
            seed.username,
            seed.password
        );
    }

    Ok(created)
}

// Insert every seed book whose ISBN is absent, returning how many were added
pub async fn seed_books(books: &dyn BookStore) -> Result<usize> {
    let mut inserted = 0;

    for seed in &SEED_BOOKS {
        if books.exists_by_isbn(seed.isbn).await? {
            continue;
        }
        books.save_book(seed.to_new_book()).await?;
        inserted += 1;
    }

    info!(inserted, "book seed checked (insert if missing). Ajoutés={}", inserted);

    Ok(inserted)
}

/// Seed users, then books. Any store or hashing error aborts the run.
pub async fn run(
    users: &dyn UserStore,
    books: &dyn BookStore,
    hasher: &dyn CredentialHasher,
) -> Result<SeedReport> {
    let users_created = seed_users(users, hasher).await?;
    let books_inserted = seed_books(books).await?;

    Ok(SeedReport {
        users_created,
        books_inserted,
    })
}

// Seed the SQLite database with bcrypt-hashed passwords
pub async fn seed_database(pool: &SqlitePool) -> Result<SeedReport> {
    let store = SqliteStore::new(pool.clone());
    run(&store, &store, &BcryptHasher::default()).await
}
