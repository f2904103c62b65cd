use std::collections::HashMap;

/// Type names gcc gets close to, but not exactly, what the declaration says.
/// Most of these are a `struct` tag the compiler puts in front of a typedef.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("struct GList *", "GList *"),
    ("struct GHashTable *", "GHashTable *"),
    ("struct attr_update_data_t *", "attr_update_data_t *"),
    ("crm_exit_e", "crm_exit_t"),
    ("struct crm_time_t *", "crm_time_t *"),
    ("struct crm_time_period_t *", "crm_time_period_t *"),
    ("pcmk__fence_history", "enum pcmk__fence_history"),
    ("pcmk_pacemakerd_state", "enum pcmk_pacemakerd_state"),
    ("struct lrmd_list_t *", "lrmd_list_t *"),
    ("struct pcmk__location_t *", "pcmk__location_t *"),
    ("struct pcmk__op_digest_t *", "pcmk__op_digest_t *"),
    ("struct pcmk__ticket_t *", "pcmk__ticket_t *"),
    ("struct pcmk_action_t *", "pcmk_action_t *"),
    ("struct pcmk_node_t *", "pcmk_node_t *"),
    ("struct pcmk_resource_t *", "pcmk_resource_t *"),
    ("struct pcmk_scheduler_t *", "pcmk_scheduler_t *"),
    ("struct resource_checks_t *", "resource_checks_t *"),
    ("struct stonith_history_t *", "stonith_history_t *"),
    ("struct xmlNode *", "xmlNode *"),
    ("long long unsigned int", "unsigned long long int"),
];

/// Maps an as-reported type string to the string declarations use for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty();
        table.extend(
            BUILTIN_ALIASES
                .iter()
                .map(|(reported, canonical)| (reported.to_string(), canonical.to_string())),
        );
        table
    }

    /// Later entries replace earlier ones for the same reported name.
    pub fn extend(&mut self, aliases: impl IntoIterator<Item = (String, String)>) {
        self.entries.extend(aliases);
    }

    pub fn canonicalize<'a>(&'a self, raw: &'a str) -> &'a str {
        self.entries.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}
