mod mcp_workflow;
