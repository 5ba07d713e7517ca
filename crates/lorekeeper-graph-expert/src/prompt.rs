//! Prompt construction for the semantic check

use lorekeeper_domain::{Entity, EntityId, Relationship, RelationshipSuggestion};
use std::collections::HashMap;

/// Builds the user prompt describing the graph under review
pub struct SemanticPromptBuilder<'a> {
    entities: &'a [Entity],
    relationships: &'a [Relationship],
    suggestions: &'a [RelationshipSuggestion],
    justification_max_chars: usize,
    max_relationships: usize,
}

impl<'a> SemanticPromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(
        entities: &'a [Entity],
        relationships: &'a [Relationship],
        suggestions: &'a [RelationshipSuggestion],
    ) -> Self {
        Self {
            entities,
            relationships,
            suggestions,
            justification_max_chars: 200,
            max_relationships: 200,
        }
    }

    /// Truncate suggestion justifications to this many characters
    pub fn with_justification_limit(mut self, max_chars: usize) -> Self {
        self.justification_max_chars = max_chars;
        self
    }

    /// List at most this many existing relationships
    pub fn with_relationship_limit(mut self, max_relationships: usize) -> Self {
        self.max_relationships = max_relationships;
        self
    }

    /// Build the user prompt
    pub fn build(&self) -> String {
        let roster: HashMap<EntityId, &Entity> = self.entities.iter().map(|e| (e.id, e)).collect();
        let describe = |id: EntityId, fallback_name: &str| match roster.get(&id) {
            Some(e) => format!("{} ({})", e.name, e.entity_type),
            None if fallback_name.is_empty() => format!("#{} (unknown)", id),
            None => format!("{} (unknown)", fallback_name),
        };

        let mut prompt = String::new();

        // 1. Persisted edges
        prompt.push_str("Existing relationships:\n");
        if self.relationships.is_empty() {
            prompt.push_str("(none)\n");
        }
        for r in self.relationships.iter().take(self.max_relationships) {
            prompt.push_str(&format!(
                "- {} --[{}]--> {}\n",
                describe(r.source_entity_id, ""),
                r.relationship_type,
                describe(r.target_entity_id, ""),
            ));
        }
        if self.relationships.len() > self.max_relationships {
            prompt.push_str(&format!(
                "(… {} more relationships not shown)\n",
                self.relationships.len() - self.max_relationships
            ));
        }
        prompt.push('\n');

        // 2. Proposed edges
        prompt.push_str("Proposed relationships:\n");
        if self.suggestions.is_empty() {
            prompt.push_str("(none)\n");
        }
        for s in self.suggestions {
            prompt.push_str(&format!(
                "- {} --[{}]--> {}",
                describe(s.source_entity_id, &s.source_entity_name),
                s.relationship_type,
                describe(s.target_entity_id, &s.target_entity_name),
            ));
            let justification = s.description.trim();
            if !justification.is_empty() {
                prompt.push_str(": ");
                prompt.push_str(&truncate_chars(justification, self.justification_max_chars));
            }
            prompt.push('\n');
        }
        prompt.push('\n');

        // 3. Roster
        prompt.push_str("Entities:\n");
        for e in self.entities {
            prompt.push_str(&format!("- {} ({})\n", e.name, e.entity_type));
        }
        prompt.push('\n');

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}

/// Truncate to at most `max_chars` characters, marking the cut with `…`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
    }
}

/// System instructions for the semantic check
pub const SYSTEM_INSTRUCTIONS: &str = r#"You review the knowledge graph of a tabletop roleplaying campaign.
Entities are people, places, items, factions and events. Relationships are typed, directed edges between them.

Report only these two kinds of problem:
- redundant_edge: two relationships between the same pair of entities convey the same meaning under different type names
- implied_edge: a relationship that is already derivable by traversing through an intermediate entity

Rules:
- Be conservative. If you are not sure, report nothing.
- A relationship type and its inverse describe one fact seen from both ends. Never report direction-only duplicates.
- Only name entities that appear in the entity list.
- Do not comment on anything else (tone, missing details, spelling)."#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (JSON object only, no additional text):
{
  "findings": [
    {
      "findingType": "redundant_edge or implied_edge",
      "description": "what is redundant or implied, and why",
      "involvedEntities": ["Entity Name", "Entity Name"],
      "suggestion": "optional remedy"
    }
  ]
}

If there is nothing to report, return {"findings": []}."#;
