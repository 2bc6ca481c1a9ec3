use pmv_host::{Host, TypeCode, Value};
use pmv_render::{DisplayHint, DisplayPass, Error, Printer, Registry};

/// One displayed value and its expanded children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub label: String,
    pub text: String,
    pub hint: Option<DisplayHint>,
    /// The value could not be rendered; `text` holds the error.
    pub failed: bool,
    pub children: Vec<Node>,
    /// More children exist than were shown.
    pub truncated: bool,
}

impl Node {
    fn new(label: String, text: String, hint: Option<DisplayHint>) -> Self {
        Self {
            label,
            text,
            hint,
            failed: false,
            children: Vec::new(),
            truncated: false,
        }
    }

    fn error(label: String, err: &dyn std::fmt::Display) -> Self {
        Self {
            failed: true,
            ..Self::new(label, format!("<error: {err}>"), None)
        }
    }
}

/// Walks values the way an interactive debugger displays them: custom
/// printers where the registry has one, the host's generic formatting
/// otherwise.
///
/// Failures are contained to the value that produced them; siblings and
/// parents are still rendered.
pub struct Inspector<'a> {
    /// `None` shows raw host formatting only.
    pub registry: Option<&'a Registry>,
    pub max_depth: usize,
    pub max_children: usize,
}

impl Inspector<'_> {
    /// Render a top-level value in a fresh display pass.
    pub fn inspect_root(&self, host: &dyn Host, label: &str, value: &Value) -> Node {
        let pass = DisplayPass::new(host);
        self.inspect(&pass, label.to_owned(), value, 0)
    }

    fn inspect(&self, pass: &DisplayPass<'_>, label: String, value: &Value, depth: usize) -> Node {
        let printer = match self.registry {
            Some(registry) => registry.lookup(pass.host(), value),
            None => Ok(None),
        };
        match printer {
            Ok(Some(printer)) => self.inspect_printed(pass, label, &*printer, depth),
            Ok(None) => self.inspect_generic(pass, label, value, depth),
            Err(err) => {
                tracing::warn!("cannot select printer for {label}: {err}");
                Node::error(label, &err)
            }
        }
    }

    fn inspect_printed(
        &self,
        pass: &DisplayPass<'_>,
        label: String,
        printer: &dyn Printer,
        depth: usize,
    ) -> Node {
        let text = match printer.to_string(pass) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("failed to render {label}: {err}");
                return Node::error(label, &err);
            }
        };

        let mut node = Node::new(label, text, printer.display_hint());
        if depth >= self.max_depth {
            return node;
        }

        let children = printer
            .children(pass)
            .and_then(|children| Ok((children, printer.child_pass(pass)?)));
        match children {
            Ok((children, child_pass)) => {
                let children = children.into_iter().map(|c| Ok((c.label, c.value)));
                self.inspect_children(&child_pass, &mut node, children, depth);
            }
            Err(err) => {
                tracing::warn!("failed to expand {}: {err}", node.label);
                node.children.push(Node::error(String::from("<children>"), &err));
            }
        }
        node
    }

    fn inspect_generic(
        &self,
        pass: &DisplayPass<'_>,
        label: String,
        value: &Value,
        depth: usize,
    ) -> Node {
        let host = pass.host();
        let mut node = Node::new(label, host.format(value), None);
        if depth >= self.max_depth {
            return node;
        }

        if let Some(entries) = host.entries(value) {
            let children = entries.map(|entry| {
                let entry = entry?;
                Ok((format!("[{}]", host.format(&entry.key)), entry.value))
            });
            self.inspect_children(pass, &mut node, children, depth);
        } else if let Some(elements) = host.elements(value) {
            let children = elements
                .enumerate()
                .map(|(index, element)| Ok((format!("[{index}]"), element?)));
            self.inspect_children(pass, &mut node, children, depth);
        } else {
            match host.basic_type(value.ty()) {
                Ok(ty) if ty.code == TypeCode::Struct => {
                    let children = ty.fields.iter().map(|field| {
                        let label = if field.is_base_class {
                            format!("<{}>", field.name)
                        } else {
                            field.name.clone()
                        };
                        Ok((label, host.field(value, &field.name)?))
                    });
                    self.inspect_children(pass, &mut node, children, depth);
                }
                Ok(_) => {}
                Err(err) => node.children.push(Node::error(String::from("<type>"), &err)),
            }
        }
        node
    }

    fn inspect_children<I>(&self, pass: &DisplayPass<'_>, node: &mut Node, children: I, depth: usize)
    where
        I: Iterator<Item = Result<(String, Value), pmv_host::HostError>>,
    {
        for (index, child) in children.enumerate() {
            if index == self.max_children {
                node.truncated = true;
                break;
            }
            match child {
                Ok((label, value)) => node.children.push(self.inspect(pass, label, &value, depth + 1)),
                Err(err) => {
                    let err = Error::from(err);
                    tracing::warn!("unreadable child of {}: {err}", node.label);
                    node.children.push(Node::error(format!("[{index}]"), &err));
                }
            }
        }
    }
}
