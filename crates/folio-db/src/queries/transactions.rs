use anyhow::{Result, anyhow};
use rusqlite::Row;

use folio_types::models::{Transaction, TransactionStatus, TransactionType};

use super::{OptionalExt, text_enum, timestamp};
use crate::Database;
use crate::models::NewTransaction;

const TRANSACTION_COLUMNS: &str = "id, booking_id, gig_post_id, payer_id, payee_id, amount, \
                                   currency, type, payment_method, external_transaction_id, \
                                   status, metadata, created_at, updated_at";

impl Database {
    /// Records a pending deposit. Nothing is charged here; settlement happens
    /// with the payment provider.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO transactions
                    (booking_id, payer_id, payee_id, amount, currency, type, payment_method, status)
                 VALUES (?1, ?2, ?3, ?4, 'USD', ?5, ?6, ?7)",
                rusqlite::params![
                    tx.booking_id,
                    tx.payer_id,
                    tx.payee_id,
                    tx.amount,
                    TransactionType::Deposit.as_str(),
                    tx.payment_method.as_str(),
                    TransactionStatus::Pending.as_str(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1");
            conn.prepare(&sql)?
                .query_row([id], transaction_from_row)
                .optional()?
                .ok_or_else(|| anyhow!("Transaction {} vanished after insert", id))
        })
    }

    /// Every transaction the user paid or received, newest first.
    pub fn get_transactions_by_user(&self, user_id: i64) -> Result<Vec<Transaction>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions
                 WHERE payer_id = ?1 OR payee_id = ?1
                 ORDER BY created_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], transaction_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        gig_post_id: row.get(2)?,
        payer_id: row.get(3)?,
        payee_id: row.get(4)?,
        amount: row.get(5)?,
        currency: row.get(6)?,
        kind: text_enum(row, 7)?,
        payment_method: text_enum(row, 8)?,
        external_transaction_id: row.get(9)?,
        status: text_enum(row, 10)?,
        metadata: row.get(11)?,
        created_at: timestamp(row, 12)?,
        updated_at: timestamp(row, 13)?,
    })
}

#[cfg(test)]
mod tests {
    use folio_types::models::PaymentMethod;

    use super::*;
    use crate::queries::fixtures;

    #[test]
    fn payer_and_payee_both_see_the_transaction() {
        let db = Database::open_in_memory().unwrap();
        let client = fixtures::user(&db, "client");
        let bystander = fixtures::user(&db, "bystander");
        let (creative, profile) = fixtures::creative(&db, "creative");
        let booking = fixtures::booking(&db, client.id, profile.id);

        let tx = db
            .insert_transaction(&NewTransaction {
                booking_id: booking.id,
                payer_id: client.id,
                payee_id: creative.id,
                amount: booking.deposit_amount,
                payment_method: PaymentMethod::Paystack,
            })
            .unwrap();
        assert_eq!(tx.kind, TransactionType::Deposit);
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.currency, "USD");
        assert_eq!(tx.amount, 10_000);

        assert_eq!(db.get_transactions_by_user(client.id).unwrap(), vec![tx.clone()]);
        assert_eq!(db.get_transactions_by_user(creative.id).unwrap(), vec![tx]);
        assert!(db.get_transactions_by_user(bystander.id).unwrap().is_empty());
    }
}
