use tracing::debug;

use crate::error::TaxError;

pub type NodeIndex = usize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub label: Option<String>,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
}

#[derive(Debug, Clone)]
pub struct TaxonTree {
    nodes: Vec<TreeNode>,
    root: NodeIndex,
}

impl TaxonTree {
    pub fn parse_newick(input: &str) -> Result<Self, TaxError> {
        let tree = NewickParser::new(input).parse()?;
        debug!(nodes = tree.len(), "parsed taxonomy tree");
        Ok(tree)
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn is_root(&self, idx: NodeIndex) -> bool {
        idx == self.root
    }

    pub fn node(&self, idx: NodeIndex) -> &TreeNode {
        &self.nodes[idx]
    }

    pub fn label(&self, idx: NodeIndex) -> Option<&str> {
        self.nodes[idx].label.as_deref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn postorder(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, 0usize)];
        while let Some((idx, next_child)) = stack.pop() {
            let children = &self.nodes[idx].children;
            if next_child < children.len() {
                stack.push((idx, next_child + 1));
                stack.push((children[next_child], 0));
            } else {
                order.push(idx);
            }
        }
        order
    }

    // Nearest first, ending with the root.
    pub fn ancestors(&self, idx: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.nodes[idx].parent,
        }
    }
}

pub struct Ancestors<'a> {
    tree: &'a TaxonTree,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.nodes[current].parent;
        Some(current)
    }
}

struct NewickParser<'a> {
    input: &'a str,
    pos: usize,
    nodes: Vec<TreeNode>,
    open: Vec<NodeIndex>,
    // Node whose label or branch length may still follow.
    current: Option<NodeIndex>,
    length_seen: bool,
}

impl<'a> NewickParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            nodes: Vec::new(),
            open: Vec::new(),
            current: None,
            length_seen: false,
        }
    }

    fn parse(mut self) -> Result<TaxonTree, TaxError> {
        loop {
            let Some(ch) = self.peek() else {
                return Err(self.error("missing terminating ';'"));
            };
            match ch {
                '(' => {
                    if self.current.is_some() {
                        return Err(self.error("expected ',' or ')' before '('"));
                    }
                    let idx = self.new_node()?;
                    self.open.push(idx);
                    self.bump(ch);
                }
                ',' => {
                    if self.open.is_empty() {
                        return Err(self.error("',' outside of parentheses"));
                    }
                    self.current_or_new()?;
                    self.current = None;
                    self.length_seen = false;
                    self.bump(ch);
                }
                ')' => {
                    if self.open.is_empty() {
                        return Err(self.error("unbalanced ')'"));
                    }
                    self.current_or_new()?;
                    self.current = self.open.pop();
                    self.length_seen = false;
                    self.bump(ch);
                }
                ':' => {
                    if self.length_seen {
                        return Err(self.error("node has more than one branch length"));
                    }
                    self.bump(ch);
                    self.current_or_new()?;
                    self.branch_length()?;
                    self.length_seen = true;
                }
                '[' => self.comment()?,
                ']' => return Err(self.error("unmatched ']'")),
                ';' => {
                    if !self.open.is_empty() {
                        return Err(self.error("unbalanced '(' at end of tree"));
                    }
                    self.bump(ch);
                    break;
                }
                '\'' => {
                    let start = self.pos;
                    let label = self.quoted_label()?;
                    self.set_label(label, start)?;
                }
                ch if ch.is_whitespace() => self.bump(ch),
                _ => {
                    let start = self.pos;
                    let label = self.unquoted_label();
                    self.set_label(label, start)?;
                }
            }
        }

        if self.nodes.is_empty() {
            return Err(self.error("tree is empty"));
        }
        while let Some(ch) = self.peek() {
            match ch {
                '[' => self.comment()?,
                ch if ch.is_whitespace() => self.bump(ch),
                _ => return Err(self.error("unexpected content after ';'")),
            }
        }

        Ok(TaxonTree {
            nodes: self.nodes,
            root: 0,
        })
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self, ch: char) {
        self.pos += ch.len_utf8();
    }

    fn error(&self, message: &str) -> TaxError {
        TaxError::TreeParse {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn new_node(&mut self) -> Result<NodeIndex, TaxError> {
        let parent = self.open.last().copied();
        if parent.is_none() && !self.nodes.is_empty() {
            return Err(self.error("tree has more than one root"));
        }
        let idx = self.nodes.len();
        self.nodes.push(TreeNode {
            parent,
            ..TreeNode::default()
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(idx);
        }
        Ok(idx)
    }

    fn current_or_new(&mut self) -> Result<NodeIndex, TaxError> {
        match self.current {
            Some(idx) => Ok(idx),
            None => {
                let idx = self.new_node()?;
                self.current = Some(idx);
                self.length_seen = false;
                Ok(idx)
            }
        }
    }

    fn set_label(&mut self, label: String, start: usize) -> Result<(), TaxError> {
        if self.length_seen {
            return Err(TaxError::TreeParse {
                offset: start,
                message: "label after branch length".to_string(),
            });
        }
        let idx = self.current_or_new()?;
        if self.nodes[idx].label.is_some() {
            return Err(TaxError::TreeParse {
                offset: start,
                message: "node has more than one label".to_string(),
            });
        }
        let label = label.trim();
        if !label.is_empty() {
            self.nodes[idx].label = Some(label.to_string());
        }
        Ok(())
    }

    fn unquoted_label(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || "()[]':;,".contains(ch) {
                break;
            }
            self.bump(ch);
        }
        self.input[start..self.pos].replace('_', " ")
    }

    fn quoted_label(&mut self) -> Result<String, TaxError> {
        let start = self.pos;
        self.bump('\'');
        let mut label = String::new();
        loop {
            match self.peek() {
                Some('\'') => {
                    self.bump('\'');
                    if self.peek() == Some('\'') {
                        self.bump('\'');
                        label.push('\'');
                    } else {
                        return Ok(label);
                    }
                }
                Some(ch) => {
                    self.bump(ch);
                    label.push(ch);
                }
                None => {
                    return Err(TaxError::TreeParse {
                        offset: start,
                        message: "unterminated quoted label".to_string(),
                    });
                }
            }
        }
    }

    fn branch_length(&mut self) -> Result<(), TaxError> {
        while let Some(ch) = self.peek().filter(|ch| ch.is_whitespace()) {
            self.bump(ch);
        }
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !(ch.is_ascii_digit() || "+-.eE".contains(ch)) {
                break;
            }
            self.bump(ch);
        }
        let text = &self.input[start..self.pos];
        if text.parse::<f64>().is_err() {
            return Err(TaxError::TreeParse {
                offset: start,
                message: format!("invalid branch length {text:?}"),
            });
        }
        Ok(())
    }

    fn comment(&mut self) -> Result<(), TaxError> {
        let start = self.pos;
        match self.input[start..].find(']') {
            Some(end) => {
                self.pos = start + end + 1;
                Ok(())
            }
            None => Err(TaxError::TreeParse {
                offset: start,
                message: "unterminated comment".to_string(),
            }),
        }
    }
}
