//! SQLite schema definition.

/// Complete database schema for bulklink.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Client Accounts
-- ============================================================================

CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    first_name TEXT,
    last_name TEXT,
    role TEXT NOT NULL DEFAULT 'CLIENT' CHECK (role IN ('ADMIN', 'CLIENT')),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Product Schemes
-- ============================================================================

CREATE TABLE IF NOT EXISTS product_schemes (
    id TEXT PRIMARY KEY,
    sku TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    image TEXT,
    unit_price REAL NOT NULL,
    bulk_price REAL NOT NULL,
    minimum_bulk_qty INTEGER NOT NULL DEFAULT 10,
    max_units_per_link INTEGER NOT NULL DEFAULT 1 CHECK (max_units_per_link >= 1),
    product_id TEXT,
    variant_id TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Bulk Purchases (the inventory ledger)
-- ============================================================================

CREATE TABLE IF NOT EXISTS bulk_purchases (
    id TEXT PRIMARY KEY,
    client_id TEXT NOT NULL REFERENCES clients(id),
    source_order_id TEXT NOT NULL UNIQUE,
    source_order_number TEXT,
    product_sku TEXT NOT NULL,
    product_title TEXT NOT NULL,
    product_id TEXT,
    variant_id TEXT,
    variant_title TEXT,
    quantity_purchased INTEGER NOT NULL CHECK (quantity_purchased >= 0),
    quantity_remaining INTEGER NOT NULL CHECK (quantity_remaining >= 0),
    unit_cost REAL NOT NULL DEFAULT 0,
    total_cost REAL NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'ACTIVE'
        CHECK (status IN ('ACTIVE', 'COMPLETED', 'EXPIRED', 'CANCELLED')),
    customer_name TEXT,
    customer_email TEXT,
    billing_name TEXT,
    billing_address TEXT,
    shipping_name TEXT,
    shipping_address TEXT,
    order_date TEXT,
    discount_code TEXT,
    custom_link TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (quantity_remaining <= quantity_purchased)
);

CREATE INDEX IF NOT EXISTS idx_purchases_client ON bulk_purchases(client_id);
CREATE INDEX IF NOT EXISTS idx_purchases_status ON bulk_purchases(status);
CREATE INDEX IF NOT EXISTS idx_purchases_sku ON bulk_purchases(product_sku);

-- ============================================================================
-- Patient Links
-- ============================================================================

CREATE TABLE IF NOT EXISTS patient_links (
    id TEXT PRIMARY KEY,
    client_id TEXT NOT NULL REFERENCES clients(id),
    bulk_purchase_id TEXT NOT NULL REFERENCES bulk_purchases(id),
    product_scheme_id TEXT NOT NULL REFERENCES product_schemes(id),
    link_token TEXT NOT NULL UNIQUE,
    custom_url TEXT NOT NULL,
    discount_code TEXT NOT NULL,
    max_uses INTEGER NOT NULL DEFAULT 1 CHECK (max_uses >= 1),
    current_uses INTEGER NOT NULL DEFAULT 0 CHECK (current_uses >= 0),
    is_active INTEGER NOT NULL DEFAULT 1,
    expires_at TEXT,
    patient_email TEXT,
    patient_name TEXT,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (current_uses <= max_uses)
);

CREATE INDEX IF NOT EXISTS idx_links_client ON patient_links(client_id);
CREATE INDEX IF NOT EXISTS idx_links_purchase ON patient_links(bulk_purchase_id);

-- ============================================================================
-- Patient Fulfillments (Append-Only - Immutable after creation)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patient_fulfillments (
    id TEXT PRIMARY KEY,
    patient_link_id TEXT NOT NULL REFERENCES patient_links(id),
    bulk_purchase_id TEXT NOT NULL REFERENCES bulk_purchases(id),
    patient_email TEXT NOT NULL,
    patient_name TEXT NOT NULL,
    quantity_fulfilled INTEGER NOT NULL CHECK (quantity_fulfilled >= 1),
    ip_address TEXT,
    user_agent TEXT,
    fulfillment_date TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_fulfillments_link ON patient_fulfillments(patient_link_id);
CREATE INDEX IF NOT EXISTS idx_fulfillments_purchase ON patient_fulfillments(bulk_purchase_id);

-- ============================================================================
-- Order Sync State
-- ============================================================================

CREATE TABLE IF NOT EXISTS order_sync (
    source_order_id TEXT PRIMARY KEY,
    order_number TEXT,
    payload TEXT NOT NULL,
    payload_hash TEXT NOT NULL,
    processed INTEGER NOT NULL DEFAULT 0,
    error TEXT,
    synced_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_order_sync_processed ON order_sync(processed);
"#;
