//! Idempotent demo data loaded at start-up when `database.seed` is set.
//!
//! Every row is matched on a natural key first (author name, ISBN, email),
//! so running the seed against a populated database changes nothing.

use chrono::{Duration, Months, Utc};
use tokio_util::sync::CancellationToken;

use crate::{
    error::AppResult,
    models::{Author, Book, BorrowRecord, Patron},
    repository::Repository,
};

struct SeedBook {
    title: &'static str,
    isbn: &'static str,
    publication_year: i32,
    description: &'static str,
    quantity: i32,
}

pub async fn run(repository: &Repository, token: &CancellationToken) -> AppResult<()> {
    let orwell = ensure_author(
        repository,
        token,
        "George",
        "Orwell",
        "English novelist and essayist.",
    )
    .await?;
    let austen = ensure_author(
        repository,
        token,
        "Jane",
        "Austen",
        "English novelist known for realism.",
    )
    .await?;

    ensure_book(
        repository,
        token,
        orwell,
        SeedBook {
            title: "1984",
            isbn: "9780451524935",
            publication_year: 1949,
            description: "Dystopian novel.",
            quantity: 5,
        },
    )
    .await?;
    ensure_book(
        repository,
        token,
        austen,
        SeedBook {
            title: "Pride and Prejudice",
            isbn: "9780141439518",
            publication_year: 1813,
            description: "Classic romance novel.",
            quantity: 3,
        },
    )
    .await?;

    let now = Utc::now();
    ensure_patron(repository, token, "Mariam", "Barbakadze", "mariam@example.com", 2).await?;
    ensure_patron(repository, token, "Nika", "K.", "nika@example.com", 1).await?;

    let book_id = repository.books.base().first_id(token).await?;
    let patron_id = repository.patrons.base().first_id(token).await?;
    if let (Some(book_id), Some(patron_id)) = (book_id, patron_id) {
        if !repository
            .borrow_records
            .has_active_borrow(token, book_id, patron_id)
            .await?
        {
            let mut record = BorrowRecord::open(book_id, patron_id, now - Duration::days(3), Duration::days(14));
            repository.borrow_records.base().add(token, &mut record).await?;
            tracing::debug!("Seeded borrow record {}", record.id);
        }
    }

    tracing::info!("Seed data in place");
    Ok(())
}

async fn ensure_author(
    repository: &Repository,
    token: &CancellationToken,
    first_name: &str,
    last_name: &str,
    biography: &str,
) -> AppResult<i32> {
    if let Some(author) = repository
        .authors
        .find_by_name(token, first_name, last_name)
        .await?
    {
        return Ok(author.id);
    }

    let mut author = Author {
        id: 0,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        biography: Some(biography.to_string()),
        date_of_birth: None,
    };
    repository.authors.base().add(token, &mut author).await?;
    tracing::debug!("Seeded author {}", author.full_name());
    Ok(author.id)
}

async fn ensure_book(
    repository: &Repository,
    token: &CancellationToken,
    author_id: i32,
    seed: SeedBook,
) -> AppResult<()> {
    if repository.books.find_by_isbn(token, seed.isbn).await?.is_some() {
        return Ok(());
    }

    let mut book = Book {
        id: 0,
        title: seed.title.to_string(),
        isbn: seed.isbn.to_string(),
        publication_year: seed.publication_year,
        description: Some(seed.description.to_string()),
        cover_image_url: None,
        quantity: seed.quantity,
        author_id,
    };
    repository.books.base().add(token, &mut book).await?;
    tracing::debug!("Seeded book {}", book.title);
    Ok(())
}

async fn ensure_patron(
    repository: &Repository,
    token: &CancellationToken,
    first_name: &str,
    last_name: &str,
    email: &str,
    member_for_months: u32,
) -> AppResult<()> {
    if repository.patrons.find_by_email(token, email).await?.is_some() {
        return Ok(());
    }

    let now = Utc::now();
    let mut patron = Patron {
        id: 0,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        membership_date: now
            .checked_sub_months(Months::new(member_for_months))
            .unwrap_or(now),
    };
    repository.patrons.base().add(token, &mut patron).await?;
    tracing::debug!("Seeded patron {}", patron.email);
    Ok(())
}
