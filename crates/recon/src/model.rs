/// Order key on the platform-reported transaction ledger.
pub const REPORTED_KEY: &str = "รหัสคำสั่งซื้อ";
/// Order key on the locally computed admin summary.
pub const ADMIN_KEY: &str = "หมายเลขคำสั่งซื้อ";

/// Provenance column on the ledger: name of the admin file that claimed
/// the row. Empty means unreconciled.
pub const ADMIN_PROVENANCE: &str = "admin_record_file";
/// Provenance column on the admin summary: name of the ledger file its
/// rows were matched into.
pub const REPORTED_PROVENANCE: &str = "reported_file";

/// Financial columns the admin side is authoritative for on matched rows.
pub const DATA_COLUMNS: [&str; 3] =
    ["ราคาขายสุทธิ", "ค่าจัดส่งที่ชำระโดยผู้ซื้อ", "ค่าจัดส่งที่ Shopee ออกให้โดยประมาณ"];

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Clear stale claims and re-match instead of failing on conflicts.
    pub allow_replace: bool,
}

/// What one reconciliation pass did.
#[derive(Debug, Clone, Copy)]
pub struct CheckOutcome {
    /// Rows matched by this pass.
    pub matched: usize,
    /// Ledger rows already claimed before this pass.
    pub already_matched: usize,
    /// Total ledger rows.
    pub total: usize,
    /// Ledger rows still unclaimed after this pass.
    pub unmatched_after: usize,
    /// False when the pass was a no-op (zero matches); callers skip
    /// persistence in that case.
    pub changed: bool,
}
