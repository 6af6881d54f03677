use std::str::FromStr;

use anyhow::Context;
use chrono::NaiveDateTime;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::error::AdminError;
use crate::models::{
    ActivityLog, Counselor, Event, Institution, Student, User, VerificationStatus,
};
use crate::store::{Applied, Directory, StatusChange};
use crate::transition::TargetKind;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn table(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Institution => "admin_console.institutions",
        TargetKind::Student => "admin_console.students",
        TargetKind::Counselor => "admin_console.counselors",
        TargetKind::User => "admin_console.users",
        TargetKind::Event => "admin_console.events",
    }
}

fn parse<T>(row: &PgRow, column: &str) -> anyhow::Result<T>
where
    T: FromStr<Err = AdminError>,
{
    let raw: String = row.try_get(column)?;
    Ok(raw.parse()?)
}

/// Inserts every record of `directory`, skipping ids that already exist.
pub async fn seed(pool: &PgPool, directory: &Directory) -> anyhow::Result<u64> {
    let mut inserted = 0;
    for institution in directory.institutions.as_slice() {
        inserted += insert_institution(pool, institution).await?;
    }
    for student in directory.students.as_slice() {
        inserted += insert_student(pool, student).await?;
    }
    for counselor in directory.counselors.as_slice() {
        inserted += insert_counselor(pool, counselor).await?;
    }
    for user in directory.users.as_slice() {
        inserted += insert_user(pool, user).await?;
    }
    for event in directory.events.as_slice() {
        inserted += insert_event(pool, event).await?;
    }
    for entry in &directory.activity {
        sqlx::query(
            r#"
            INSERT INTO admin_console.activity_logs
            (id, action, entity_kind, entity_id, entity_name, performed_by, timestamp, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(entry.id)
        .bind(&entry.action)
        .bind(entry.entity_kind.as_str())
        .bind(&entry.entity_id)
        .bind(&entry.entity_name)
        .bind(&entry.performed_by)
        .bind(entry.timestamp)
        .bind(&entry.details)
        .execute(pool)
        .await?;
    }
    Ok(inserted)
}

async fn insert_institution(pool: &PgPool, record: &Institution) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO admin_console.institutions
        (id, name, email, phone, address, admin_name, status, total_students,
         total_counselors, created_at, verified_at, generation)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(&record.email)
    .bind(&record.phone)
    .bind(&record.address)
    .bind(&record.admin_name)
    .bind(record.status.as_str())
    .bind(record.total_students)
    .bind(record.total_counselors)
    .bind(record.created_at)
    .bind(record.verified_at)
    .bind(record.generation)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

async fn insert_student(pool: &PgPool, record: &Student) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO admin_console.students
        (id, name, email, institution_id, status, enrollment_number, created_at,
         verified_at, generation)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(&record.email)
    .bind(&record.institution_id)
    .bind(record.status.as_str())
    .bind(&record.enrollment_number)
    .bind(record.created_at)
    .bind(record.verified_at)
    .bind(record.generation)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

async fn insert_counselor(pool: &PgPool, record: &Counselor) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO admin_console.counselors
        (id, name, email, institution_id, status, credentials, specialization,
         created_at, verified_at, generation)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(&record.email)
    .bind(&record.institution_id)
    .bind(record.status.as_str())
    .bind(&record.credentials)
    .bind(&record.specialization)
    .bind(record.created_at)
    .bind(record.verified_at)
    .bind(record.generation)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

async fn insert_user(pool: &PgPool, record: &User) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO admin_console.users
        (id, name, email, role, status, created_at, last_login, generation)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(&record.email)
    .bind(record.role.as_str())
    .bind(record.status.as_str())
    .bind(record.created_at)
    .bind(record.last_login)
    .bind(record.generation)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

async fn insert_event(pool: &PgPool, record: &Event) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO admin_console.events
        (id, title, description, event_type, status, date, time, location, organizer,
         attendees, max_attendees, institution_id, generation)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&record.id)
    .bind(&record.title)
    .bind(&record.description)
    .bind(record.event_type.as_str())
    .bind(record.status.as_str())
    .bind(record.date)
    .bind(&record.time)
    .bind(&record.location)
    .bind(&record.organizer)
    .bind(record.attendees)
    .bind(record.max_attendees)
    .bind(&record.institution_id)
    .bind(record.generation)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Materialises the whole directory in stored order.
pub async fn load_directory(pool: &PgPool) -> anyhow::Result<Directory> {
    let mut institutions = Vec::new();
    for row in sqlx::query("SELECT * FROM admin_console.institutions ORDER BY seq")
        .fetch_all(pool)
        .await?
    {
        institutions.push(Institution {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            admin_name: row.try_get("admin_name")?,
            status: parse(&row, "status")?,
            total_students: row.try_get("total_students")?,
            total_counselors: row.try_get("total_counselors")?,
            created_at: row.try_get("created_at")?,
            verified_at: row.try_get("verified_at")?,
            generation: row.try_get("generation")?,
        });
    }

    let mut students = Vec::new();
    for row in sqlx::query("SELECT * FROM admin_console.students ORDER BY seq")
        .fetch_all(pool)
        .await?
    {
        students.push(Student {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            institution_id: row.try_get("institution_id")?,
            status: parse(&row, "status")?,
            enrollment_number: row.try_get("enrollment_number")?,
            created_at: row.try_get("created_at")?,
            verified_at: row.try_get("verified_at")?,
            generation: row.try_get("generation")?,
        });
    }

    let mut counselors = Vec::new();
    for row in sqlx::query("SELECT * FROM admin_console.counselors ORDER BY seq")
        .fetch_all(pool)
        .await?
    {
        counselors.push(Counselor {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            institution_id: row.try_get("institution_id")?,
            status: parse(&row, "status")?,
            credentials: row.try_get("credentials")?,
            specialization: row.try_get("specialization")?,
            created_at: row.try_get("created_at")?,
            verified_at: row.try_get("verified_at")?,
            generation: row.try_get("generation")?,
        });
    }

    let mut users = Vec::new();
    for row in sqlx::query("SELECT * FROM admin_console.users ORDER BY seq")
        .fetch_all(pool)
        .await?
    {
        users.push(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role: parse(&row, "role")?,
            status: parse(&row, "status")?,
            created_at: row.try_get("created_at")?,
            last_login: row.try_get("last_login")?,
            generation: row.try_get("generation")?,
        });
    }

    let mut events = Vec::new();
    for row in sqlx::query("SELECT * FROM admin_console.events ORDER BY seq")
        .fetch_all(pool)
        .await?
    {
        events.push(Event {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            event_type: parse(&row, "event_type")?,
            status: parse(&row, "status")?,
            date: row.try_get("date")?,
            time: row.try_get("time")?,
            location: row.try_get("location")?,
            organizer: row.try_get("organizer")?,
            attendees: row.try_get("attendees")?,
            max_attendees: row.try_get("max_attendees")?,
            institution_id: row.try_get("institution_id")?,
            generation: row.try_get("generation")?,
        });
    }

    let mut activity = Vec::new();
    for row in sqlx::query("SELECT * FROM admin_console.activity_logs ORDER BY timestamp DESC")
        .fetch_all(pool)
        .await?
    {
        activity.push(ActivityLog {
            id: row.try_get("id")?,
            action: row.try_get("action")?,
            entity_kind: parse(&row, "entity_kind")?,
            entity_id: row.try_get("entity_id")?,
            entity_name: row.try_get("entity_name")?,
            performed_by: row.try_get("performed_by")?,
            timestamp: row.try_get("timestamp")?,
            details: row.try_get("details")?,
        });
    }

    log::debug!(
        "loaded {} institutions, {} students, {} counselors, {} users, {} events",
        institutions.len(),
        students.len(),
        counselors.len(),
        users.len(),
        events.len()
    );

    Directory::new(institutions, students, counselors, users, events, activity)
        .context("stored directory is inconsistent")
}

/// Writes an applied transition back, guarded by the generation the record
/// held when it was loaded.
pub async fn persist(pool: &PgPool, applied: &Applied, at: NaiveDateTime) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    let verified_at = match applied.change {
        StatusChange::Verification {
            to: VerificationStatus::Verified,
            ..
        } => Some(at.date()),
        _ => None,
    };

    let result = match applied.kind {
        TargetKind::User | TargetKind::Event => {
            let query = format!(
                "UPDATE {} SET status = $1, generation = generation + 1 \
                 WHERE id = $2 AND generation = $3",
                table(applied.kind)
            );
            sqlx::query(&query)
                .bind(applied.change.to_str())
                .bind(&applied.id)
                .bind(applied.previous_generation)
                .execute(&mut *tx)
                .await?
        }
        TargetKind::Institution | TargetKind::Student | TargetKind::Counselor => {
            let query = format!(
                "UPDATE {} SET status = $1, generation = generation + 1, \
                 verified_at = COALESCE($2, verified_at) \
                 WHERE id = $3 AND generation = $4",
                table(applied.kind)
            );
            sqlx::query(&query)
                .bind(applied.change.to_str())
                .bind(verified_at)
                .bind(&applied.id)
                .bind(applied.previous_generation)
                .execute(&mut *tx)
                .await?
        }
    };

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AdminError::ConcurrentUpdate {
            kind: applied.kind,
            id: applied.id.clone(),
        }
        .into());
    }

    if let Some(entry) = &applied.activity {
        insert_activity(&mut tx, entry).await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn insert_activity(
    tx: &mut Transaction<'_, Postgres>,
    entry: &ActivityLog,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO admin_console.activity_logs
        (id, action, entity_kind, entity_id, entity_name, performed_by, timestamp, details)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(entry.id)
    .bind(&entry.action)
    .bind(entry.entity_kind.as_str())
    .bind(&entry.entity_id)
    .bind(&entry.entity_name)
    .bind(&entry.performed_by)
    .bind(entry.timestamp)
    .bind(&entry.details)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Imports CSV rows of one record type. Columns are the record's field
/// names; rows whose id already exists are skipped.
pub async fn import_csv(
    pool: &PgPool,
    kind: TargetKind,
    csv_path: &std::path::Path,
) -> anyhow::Result<u64> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0u64;

    match kind {
        TargetKind::Institution => {
            for result in reader.deserialize::<Institution>() {
                inserted += insert_institution(pool, &result?).await?;
            }
        }
        TargetKind::Student => {
            for result in reader.deserialize::<Student>() {
                inserted += insert_student(pool, &result?).await?;
            }
        }
        TargetKind::Counselor => {
            for result in reader.deserialize::<Counselor>() {
                inserted += insert_counselor(pool, &result?).await?;
            }
        }
        TargetKind::User => {
            for result in reader.deserialize::<User>() {
                inserted += insert_user(pool, &result?).await?;
            }
        }
        TargetKind::Event => {
            for result in reader.deserialize::<Event>() {
                inserted += insert_event(pool, &result?).await?;
            }
        }
    }

    Ok(inserted)
}
