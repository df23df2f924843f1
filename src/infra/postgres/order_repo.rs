use {
    crate::domain::{
        error::FulfillmentError,
        id::{OrderId, UserId},
        money::MoneyAmount,
        order::{AddressKind, Configuration, MarkPaid, Order, PostalAddress, StoredAddress},
        store::OrderStore,
    },
    chrono::{DateTime, Utc},
    sqlx::{PgPool, Postgres, Transaction},
    std::{future::Future, pin::Pin},
    uuid::Uuid,
};

const SELECT_ORDER: &str = r#"
    SELECT o.id, o.user_id, o.amount, o.is_paid, o.confirmation_sent_at,
           o.created_at, o.updated_at,
           c.color, c.material, c.finish, c.model, c.cropped_image_url,
           s.id AS shipping_id, s.name AS shipping_name, s.street AS shipping_street,
           s.city AS shipping_city, s.state AS shipping_state,
           s.postal_code AS shipping_postal_code, s.country AS shipping_country,
           b.id AS billing_id, b.name AS billing_name, b.street AS billing_street,
           b.city AS billing_city, b.state AS billing_state,
           b.postal_code AS billing_postal_code, b.country AS billing_country
    FROM orders o
    JOIN configurations c ON c.id = o.configuration_id
    LEFT JOIN shipping_addresses s ON s.id = o.shipping_address_id
    LEFT JOIN billing_addresses b ON b.id = o.billing_address_id
    WHERE o.id = $1
"#;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    amount: i64,
    is_paid: bool,
    confirmation_sent_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    color: String,
    material: String,
    finish: String,
    model: String,
    cropped_image_url: Option<String>,
    shipping_id: Option<Uuid>,
    shipping_name: Option<String>,
    shipping_street: Option<String>,
    shipping_city: Option<String>,
    shipping_state: Option<String>,
    shipping_postal_code: Option<String>,
    shipping_country: Option<String>,
    billing_id: Option<Uuid>,
    billing_name: Option<String>,
    billing_street: Option<String>,
    billing_city: Option<String>,
    billing_state: Option<String>,
    billing_postal_code: Option<String>,
    billing_country: Option<String>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, FulfillmentError> {
        let amount = MoneyAmount::new(self.amount).ok_or_else(|| {
            FulfillmentError::StoreWriteFailed(sqlx::Error::Decode(
                format!("negative amount on order {}", self.id).into(),
            ))
        })?;

        let shipping_address = stored_address(
            self.shipping_id,
            self.shipping_name,
            self.shipping_street,
            self.shipping_city,
            self.shipping_state,
            self.shipping_postal_code,
            self.shipping_country,
        );
        let billing_address = stored_address(
            self.billing_id,
            self.billing_name,
            self.billing_street,
            self.billing_city,
            self.billing_state,
            self.billing_postal_code,
            self.billing_country,
        );

        Ok(Order {
            id: OrderId::new(self.id)?,
            user_id: UserId::new(self.user_id)?,
            is_paid: self.is_paid,
            amount,
            configuration: Configuration {
                color: self.color,
                material: self.material,
                finish: self.finish,
                model: self.model,
                cropped_image_url: self.cropped_image_url,
            },
            shipping_address,
            billing_address,
            confirmation_sent_at: self.confirmation_sent_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// LEFT JOIN columns: all present or all NULL.
#[allow(clippy::too_many_arguments)]
fn stored_address(
    id: Option<Uuid>,
    name: Option<String>,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
) -> Option<StoredAddress> {
    Some(StoredAddress {
        id: id?,
        address: PostalAddress {
            name: name?,
            street: street?,
            city: city?,
            state,
            postal_code: postal_code?,
            country: country?,
        },
    })
}

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_order(&self, order_id: &OrderId) -> Result<Option<Order>, FulfillmentError> {
        let row = sqlx::query_as::<_, OrderRow>(SELECT_ORDER)
            .bind(order_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(OrderRow::into_order).transpose()
    }

    async fn mark_paid_inner(
        &self,
        order_id: &OrderId,
        shipping: &PostalAddress,
        billing: &PostalAddress,
    ) -> Result<MarkPaid, FulfillmentError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET LOCAL lock_timeout = '5s'")
            .execute(&mut *tx)
            .await?;

        // Row lock serializes concurrent deliveries of the same checkout, so
        // only the first one sees is_paid = false.
        let is_paid =
            sqlx::query_scalar::<_, bool>("SELECT is_paid FROM orders WHERE id = $1 FOR UPDATE")
                .bind(order_id.as_str())
                .fetch_optional(&mut *tx)
                .await?;

        let Some(is_paid) = is_paid else {
            return Err(FulfillmentError::OrderNotFound(order_id.clone()));
        };

        if is_paid {
            let order = load_order(&mut tx, order_id).await?;
            tx.commit().await?;
            return Ok(MarkPaid::AlreadyPaid(order));
        }

        let shipping_id = insert_address(&mut tx, AddressKind::Shipping, shipping).await?;
        let billing_id = insert_address(&mut tx, AddressKind::Billing, billing).await?;

        sqlx::query(
            r#"
            UPDATE orders
            SET is_paid = true, shipping_address_id = $2, billing_address_id = $3,
                updated_at = now()
            WHERE id = $1 AND is_paid = false
            "#,
        )
        .bind(order_id.as_str())
        .bind(shipping_id)
        .bind(billing_id)
        .execute(&mut *tx)
        .await?;

        let order = load_order(&mut tx, order_id).await?;
        tx.commit().await?;
        Ok(MarkPaid::Transitioned(order))
    }

    async fn mark_confirmation_sent_inner(
        &self,
        order_id: &OrderId,
        at: DateTime<Utc>,
    ) -> Result<(), FulfillmentError> {
        let result = sqlx::query(
            "UPDATE orders SET confirmation_sent_at = $2, updated_at = now() WHERE id = $1",
        )
        .bind(order_id.as_str())
        .bind(at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(FulfillmentError::OrderNotFound(order_id.clone()));
        }
        Ok(())
    }
}

impl OrderStore for PgOrderStore {
    fn mark_paid(
        &self,
        order_id: &OrderId,
        shipping: &PostalAddress,
        billing: &PostalAddress,
    ) -> Pin<Box<dyn Future<Output = Result<MarkPaid, FulfillmentError>> + Send + '_>> {
        let order_id = order_id.clone();
        let shipping = shipping.clone();
        let billing = billing.clone();
        Box::pin(async move { self.mark_paid_inner(&order_id, &shipping, &billing).await })
    }

    fn mark_confirmation_sent(
        &self,
        order_id: &OrderId,
        at: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<(), FulfillmentError>> + Send + '_>> {
        let order_id = order_id.clone();
        Box::pin(async move { self.mark_confirmation_sent_inner(&order_id, at).await })
    }
}

async fn load_order(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &OrderId,
) -> Result<Order, FulfillmentError> {
    let row = sqlx::query_as::<_, OrderRow>(SELECT_ORDER)
        .bind(order_id.as_str())
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| FulfillmentError::OrderNotFound(order_id.clone()))?;
    row.into_order()
}

async fn insert_address(
    tx: &mut Transaction<'_, Postgres>,
    kind: AddressKind,
    address: &PostalAddress,
) -> Result<Uuid, FulfillmentError> {
    let sql = match kind {
        AddressKind::Shipping => {
            r#"
            INSERT INTO shipping_addresses (id, name, street, city, state, postal_code, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#
        }
        AddressKind::Billing => {
            r#"
            INSERT INTO billing_addresses (id, name, street, city, state, postal_code, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#
        }
    };

    let id = Uuid::now_v7();
    sqlx::query(sql)
        .bind(id)
        .bind(&address.name)
        .bind(&address.street)
        .bind(&address.city)
        .bind(address.state.as_deref())
        .bind(&address.postal_code)
        .bind(&address.country)
        .execute(&mut **tx)
        .await?;
    Ok(id)
}
