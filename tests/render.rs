use forensight::{
    config::Config,
    normalize::normalize,
    render::{escape_html, HtmlRenderer},
    report::{
        DocumentFindings, EvidenceResult, Findings, ImageFindings, QueryAnswer, ReportSource,
        VideoFindings,
    },
};
use serde_json::json;

fn renderer() -> HtmlRenderer {
    HtmlRenderer::new(&Config::default().render)
}

fn card(findings: Findings) -> String {
    renderer().card(&EvidenceResult {
        file: "evidence.bin".into(),
        findings,
        simulated: false,
    })
}

#[test]
fn escapes_every_markup_character() {
    assert_eq!(
        escape_html(r#"<a href="x">'&`=/"#),
        "&lt;a href&#x3D;&quot;x&quot;&gt;&#39;&amp;&#x60;&#x3D;&#x2F;"
    );
    assert_eq!(escape_html("plain ascii text"), "plain ascii text");
}

#[test]
fn script_in_summary_renders_as_text() {
    let raw = json!({"metaReport": {"finalSummary": "<script>alert(1)</script>", "results": []}});
    let report = normalize(&raw, ReportSource::Primary).expect("normalize");
    let html = renderer().summary(&report, None);
    assert!(html.contains("&lt;script&gt;alert(1)&lt;&#x2F;script&gt;"));
    assert!(!html.contains("<script>"));
}

#[test]
fn plain_summary_is_rendered_verbatim() {
    let raw = json!({"metaReport": {"finalSummary": "X", "results": []}});
    let report = normalize(&raw, ReportSource::Primary).expect("normalize");
    let html = renderer().summary(&report, None);
    assert!(html.contains("<p class=\"summary-text\">X</p>"));
}

#[test]
fn image_card_colors_by_tamper_threshold() {
    let high = card(Findings::Image(ImageFindings {
        tamper_percentage: 72.46,
        explanation: "Warped edges".into(),
        verdict: None,
    }));
    assert!(high.contains("metric danger"));
    assert!(high.contains("Tamper: 72.5%"));
    assert!(high.contains("Warped edges"));

    let low = card(Findings::Image(ImageFindings {
        tamper_percentage: 50.0,
        explanation: "ok".into(),
        verdict: None,
    }));
    assert!(low.contains("metric safe"));
    assert!(low.contains("Tamper: 50.0%"));
}

#[test]
fn video_card_without_metadata_shows_not_available() {
    let html = card(Findings::Video(VideoFindings {
        fake_ratio_percent: 0.0,
        max_fake_score: 12.0,
        frames_analyzed: Some(4),
        duration_sec: None,
        resolution: None,
        verdict: None,
    }));
    assert!(html.contains("metric safe"));
    assert!(html.contains("Fake frames: 0.0%"));
    assert!(html.contains("Duration: N/A"));
}

#[test]
fn any_fake_frame_turns_video_card_red() {
    let html = card(Findings::Video(VideoFindings {
        fake_ratio_percent: 16.67,
        max_fake_score: 88.4,
        frames_analyzed: Some(6),
        duration_sec: Some(12.0),
        resolution: Some("1280x720".into()),
        verdict: None,
    }));
    assert!(html.contains("metric danger"));
    assert!(html.contains("Max fake score: 88.4"));
    assert!(html.contains("Duration: 12.00s"));
}

#[test]
fn document_card_shows_score_and_flag_count() {
    let html = card(Findings::Document(DocumentFindings {
        danger_score: 64.0,
        flag_count: 3,
        summary: "Payment coercion".into(),
    }));
    assert!(html.contains("metric danger"));
    assert!(html.contains("Danger score: 64/100"));
    assert!(html.contains("Flags: 3"));

    let raw = json!({"results": [{"file": "t.txt", "type": "document", "report": {"summary": "calm"}}]});
    let report = normalize(&raw, ReportSource::Primary).expect("normalize");
    let html = renderer().card(&report.results[0]);
    assert!(html.contains("Flags: 0"));
    assert!(html.contains("metric safe"));
}

#[test]
fn unknown_type_dumps_truncated_payload() {
    let mut cfg = Config::default();
    cfg.render.dump_max_chars = 40;
    let renderer = HtmlRenderer::new(&cfg.render);
    let html = renderer.card(&EvidenceResult {
        file: "memo.wav".into(),
        findings: Findings::Other {
            raw_type: "audio".into(),
            payload: json!({"transcript": {"text": "x".repeat(500)}}),
        },
        simulated: false,
    });
    assert!(html.contains("memo.wav"));
    assert!(html.contains("<code>audio</code>"));
    assert!(html.contains('…'));
    assert!(!html.contains(&"x".repeat(100)));
}

#[test]
fn answer_lists_sources_in_order() {
    let html = renderer().answer(&QueryAnswer {
        answer: "A".into(),
        sources: vec!["s1".into(), "s2".into()],
    });
    assert!(html.contains("<p class=\"answer-text\">A</p>"));
    assert_eq!(html.matches("<li>").count(), 2);
    let first = html.find("<li>s1</li>").expect("s1");
    let second = html.find("<li>s2</li>").expect("s2");
    assert!(first < second);

    let bare = renderer().answer(&QueryAnswer {
        answer: "A".into(),
        sources: vec![],
    });
    assert!(!bare.contains("<li>"));
}
