use crate::Report;

/// Render the two-section plain-text report.
///
/// Sections follow the report's own ordering (tags case-insensitively,
/// port/protocol pairs by port then protocol).
///
/// # Examples
/// ```
/// use flowtag_core::{InputInfo, TagCount, make_stub_report, render_text};
///
/// let mut report = make_stub_report(InputInfo::default());
/// report.tags.push(TagCount { tag: "sv_P1".to_string(), count: 2 });
/// let text = render_text(&report);
/// assert!(text.contains("sv_P1,2\n"));
/// ```
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    out.push_str("Tag Counts:\n");
    out.push_str("Tag, Count\n");
    for entry in &report.tags {
        out.push_str(&format!("{},{}\n", entry.tag, entry.count));
    }

    out.push_str("\nPort/Protocol Combination Counts:\n");
    out.push_str("Port,Protocol,Count\n");
    for entry in &report.port_protocols {
        out.push_str(&format!(
            "{},{},{}\n",
            entry.port, entry.protocol, entry.count
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::render_text;
    use crate::{InputInfo, PortProtocolCount, TagCount, make_stub_report};

    #[test]
    fn renders_both_sections() {
        let mut report = make_stub_report(InputInfo::default());
        report.tags = vec![
            TagCount {
                tag: "sv_P1".to_string(),
                count: 2,
            },
            TagCount {
                tag: "Untagged".to_string(),
                count: 9,
            },
        ];
        report.port_protocols = vec![PortProtocolCount {
            port: 25,
            protocol: "tcp".to_string(),
            count: 1,
        }];

        let expected = "Tag Counts:\n\
                        Tag, Count\n\
                        sv_P1,2\n\
                        Untagged,9\n\
                        \n\
                        Port/Protocol Combination Counts:\n\
                        Port,Protocol,Count\n\
                        25,tcp,1\n";
        assert_eq!(render_text(&report), expected);
    }

    #[test]
    fn empty_report_keeps_headers() {
        let report = make_stub_report(InputInfo::default());
        assert_eq!(
            render_text(&report),
            "Tag Counts:\nTag, Count\n\nPort/Protocol Combination Counts:\nPort,Protocol,Count\n"
        );
    }
}
